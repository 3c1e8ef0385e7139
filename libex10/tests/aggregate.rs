// Aggregator for aggregate op integration tests in `tests/aggregate/`.

#[path = "aggregate/scenario_test.rs"]
mod scenario_test;

#[path = "aggregate/offset_property_test.rs"]
mod offset_property_test;

#[path = "aggregate/device_buffer_test.rs"]
mod device_buffer_test;
