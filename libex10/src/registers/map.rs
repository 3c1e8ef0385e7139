// libex10-rs/libex10/src/registers/map.rs

//! Fixed application register map.

use super::{RegisterAccess, RegisterInfo};

pub const COMMAND_RESULT: RegisterInfo = RegisterInfo::new("CommandResult", 0x0000, 0x0004, 1, RegisterAccess::ReadOnly);
pub const RESET_CAUSE: RegisterInfo = RegisterInfo::new("ResetCause", 0x0004, 0x0002, 1, RegisterAccess::ReadOnly);
pub const STATUS: RegisterInfo = RegisterInfo::new("Status", 0x0006, 0x0002, 1, RegisterAccess::ReadOnly);
pub const VERSION_STRING: RegisterInfo = RegisterInfo::new("VersionString", 0x0008, 0x0020, 1, RegisterAccess::ReadOnly);
pub const BUILD_NUMBER: RegisterInfo = RegisterInfo::new("BuildNumber", 0x0028, 0x0004, 1, RegisterAccess::ReadOnly);
pub const GIT_HASH: RegisterInfo = RegisterInfo::new("GitHash", 0x002C, 0x0004, 1, RegisterAccess::ReadOnly);
pub const TIMESTAMP: RegisterInfo = RegisterInfo::new("Timestamp", 0x0030, 0x0004, 1, RegisterAccess::ReadOnly);
pub const FREF_FREQ: RegisterInfo = RegisterInfo::new("FrefFreq", 0x0034, 0x0004, 1, RegisterAccess::ReadOnly);
pub const PRODUCT_SKU: RegisterInfo = RegisterInfo::new("ProductSku", 0x0068, 0x0008, 1, RegisterAccess::ReadOnly);
pub const SERIAL_NUMBER: RegisterInfo = RegisterInfo::new("SerialNumber", 0x0070, 0x0020, 1, RegisterAccess::ReadOnly);
pub const DEVICE_INFO: RegisterInfo = RegisterInfo::new("DeviceInfo", 0x0090, 0x0004, 1, RegisterAccess::ReadOnly);
pub const DEVICE_BUILD: RegisterInfo = RegisterInfo::new("DeviceBuild", 0x0094, 0x0004, 1, RegisterAccess::ReadOnly);
pub const RTL_REVISION: RegisterInfo = RegisterInfo::new("RtlRevision", 0x0098, 0x0004, 1, RegisterAccess::ReadOnly);
pub const STACK_DEPTH: RegisterInfo = RegisterInfo::new("StackDepth", 0x009C, 0x0004, 1, RegisterAccess::ReadOnly);
pub const INTERRUPT_MASK: RegisterInfo = RegisterInfo::new("InterruptMask", 0x00A0, 0x0004, 1, RegisterAccess::ReadWrite);
pub const INTERRUPT_MASK_SET: RegisterInfo = RegisterInfo::new("InterruptMaskSet", 0x00A4, 0x0004, 1, RegisterAccess::WriteOnly);
pub const INTERRUPT_MASK_CLEAR: RegisterInfo = RegisterInfo::new("InterruptMaskClear", 0x00A8, 0x0004, 1, RegisterAccess::WriteOnly);
pub const INTERRUPT_STATUS: RegisterInfo = RegisterInfo::new("InterruptStatus", 0x00AC, 0x0004, 1, RegisterAccess::ReadOnly);
pub const EVENT_FIFO_NUM_BYTES: RegisterInfo = RegisterInfo::new("EventFifoNumBytes", 0x00B0, 0x0002, 1, RegisterAccess::ReadOnly);
pub const EVENT_FIFO_INT_LEVEL: RegisterInfo = RegisterInfo::new("EventFifoIntLevel", 0x00B2, 0x0002, 1, RegisterAccess::ReadWrite);
pub const GPIO_OUTPUT_ENABLE: RegisterInfo = RegisterInfo::new("GpioOutputEnable", 0x00B4, 0x0004, 1, RegisterAccess::ReadWrite);
pub const GPIO_OUTPUT_LEVEL: RegisterInfo = RegisterInfo::new("GpioOutputLevel", 0x00B8, 0x0004, 1, RegisterAccess::ReadWrite);
pub const POWER_CONTROL_LOOP_AUX_ADC_CONTROL: RegisterInfo = RegisterInfo::new("PowerControlLoopAuxAdcControl", 0x00BC, 0x0004, 1, RegisterAccess::ReadWrite);
pub const POWER_CONTROL_LOOP_GAIN_DIVISOR: RegisterInfo = RegisterInfo::new("PowerControlLoopGainDivisor", 0x00C0, 0x0004, 1, RegisterAccess::ReadWrite);
pub const POWER_CONTROL_LOOP_MAX_ITERATIONS: RegisterInfo = RegisterInfo::new("PowerControlLoopMaxIterations", 0x00C4, 0x0004, 1, RegisterAccess::ReadWrite);
pub const POWER_CONTROL_LOOP_ADC_TARGET: RegisterInfo = RegisterInfo::new("PowerControlLoopAdcTarget", 0x00CC, 0x0004, 1, RegisterAccess::ReadWrite);
pub const POWER_CONTROL_LOOP_ADC_THRESHOLDS: RegisterInfo = RegisterInfo::new("PowerControlLoopAdcThresholds", 0x00D0, 0x0004, 1, RegisterAccess::ReadWrite);
pub const DELAY_US: RegisterInfo = RegisterInfo::new("DelayUs", 0x00D4, 0x0004, 1, RegisterAccess::ReadWrite);
pub const GPIO_OUTPUT_LEVEL_SET: RegisterInfo = RegisterInfo::new("GpioOutputLevelSet", 0x00E0, 0x0004, 1, RegisterAccess::WriteOnly);
pub const GPIO_OUTPUT_LEVEL_CLEAR: RegisterInfo = RegisterInfo::new("GpioOutputLevelClear", 0x00E4, 0x0004, 1, RegisterAccess::WriteOnly);
pub const GPIO_OUTPUT_ENABLE_SET: RegisterInfo = RegisterInfo::new("GpioOutputEnableSet", 0x00E8, 0x0004, 1, RegisterAccess::WriteOnly);
pub const GPIO_OUTPUT_ENABLE_CLEAR: RegisterInfo = RegisterInfo::new("GpioOutputEnableClear", 0x00EC, 0x0004, 1, RegisterAccess::WriteOnly);
pub const OPS_CONTROL: RegisterInfo = RegisterInfo::new("OpsControl", 0x0300, 0x0001, 1, RegisterAccess::ReadWrite);
pub const OPS_STATUS: RegisterInfo = RegisterInfo::new("OpsStatus", 0x0304, 0x0004, 1, RegisterAccess::ReadOnly);
pub const HALTED_CONTROL: RegisterInfo = RegisterInfo::new("HaltedControl", 0x0308, 0x0004, 1, RegisterAccess::ReadWrite);
pub const HALTED_STATUS: RegisterInfo = RegisterInfo::new("HaltedStatus", 0x030C, 0x0004, 1, RegisterAccess::ReadOnly);
pub const LOG_TEST_PERIOD: RegisterInfo = RegisterInfo::new("LogTestPeriod", 0x0320, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LOG_TEST_WORD_REPEAT: RegisterInfo = RegisterInfo::new("LogTestWordRepeat", 0x0324, 0x0004, 1, RegisterAccess::ReadWrite);
pub const EVENT_FIFO_TEST_PERIOD: RegisterInfo = RegisterInfo::new("EventFifoTestPeriod", 0x0328, 0x0004, 1, RegisterAccess::ReadWrite);
pub const EVENT_FIFO_TEST_PAYLOAD_NUM_WORDS: RegisterInfo = RegisterInfo::new("EventFifoTestPayloadNumWords", 0x032C, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LOG_SPEED: RegisterInfo = RegisterInfo::new("LogSpeed", 0x0330, 0x0002, 1, RegisterAccess::ReadWrite);
pub const LOG_ENABLES: RegisterInfo = RegisterInfo::new("LogEnables", 0x0334, 0x0004, 1, RegisterAccess::ReadWrite);
pub const BER_CONTROL: RegisterInfo = RegisterInfo::new("BerControl", 0x0338, 0x0004, 1, RegisterAccess::ReadWrite);
pub const BER_MODE: RegisterInfo = RegisterInfo::new("BerMode", 0x033C, 0x0001, 1, RegisterAccess::ReadWrite);
pub const HPF_OVERRIDE_SETTINGS: RegisterInfo = RegisterInfo::new("HpfOverrideSettings", 0x0344, 0x0004, 1, RegisterAccess::ReadWrite);
pub const AUX_ADC_CONTROL: RegisterInfo = RegisterInfo::new("AuxAdcControl", 0x0400, 0x0002, 1, RegisterAccess::ReadWrite);
pub const AUX_ADC_RESULTS: RegisterInfo = RegisterInfo::new("AuxAdcResults", 0x0404, 0x0002, 15, RegisterAccess::ReadOnly);
pub const AUX_DAC_CONTROL: RegisterInfo = RegisterInfo::new("AuxDacControl", 0x0430, 0x0002, 1, RegisterAccess::ReadWrite);
pub const AUX_DAC_SETTINGS: RegisterInfo = RegisterInfo::new("AuxDacSettings", 0x0432, 0x0002, 2, RegisterAccess::ReadWrite);
pub const A_TEST_MUX: RegisterInfo = RegisterInfo::new("ATestMux", 0x0440, 0x0004, 4, RegisterAccess::ReadWrite);
pub const TX_FINE_GAIN: RegisterInfo = RegisterInfo::new("TxFineGain", 0x0504, 0x0004, 1, RegisterAccess::ReadWrite);
pub const RX_GAIN_CONTROL: RegisterInfo = RegisterInfo::new("RxGainControl", 0x0508, 0x0002, 1, RegisterAccess::ReadWrite);
pub const TX_COARSE_GAIN: RegisterInfo = RegisterInfo::new("TxCoarseGain", 0x050C, 0x0004, 1, RegisterAccess::ReadWrite);
pub const RF_MODE: RegisterInfo = RegisterInfo::new("RfMode", 0x0514, 0x0004, 1, RegisterAccess::ReadWrite);
pub const DC_OFFSET: RegisterInfo = RegisterInfo::new("DcOffset", 0x0518, 0x0004, 1, RegisterAccess::ReadWrite);
pub const ETSI_BURST_OFF_TIME: RegisterInfo = RegisterInfo::new("EtsiBurstOffTime", 0x051C, 0x0004, 1, RegisterAccess::ReadWrite);
pub const CW_IS_ON: RegisterInfo = RegisterInfo::new("CwIsOn", 0x0520, 0x0004, 1, RegisterAccess::ReadOnly);
pub const MEASURE_RSSI_COUNT: RegisterInfo = RegisterInfo::new("MeasureRssiCount", 0x0528, 0x0002, 1, RegisterAccess::ReadWrite);
pub const MEASURED_RSSI_LINEAR: RegisterInfo = RegisterInfo::new("MeasuredRssiLinear", 0x0540, 0x0004, 5, RegisterAccess::ReadOnly);
pub const MEASURED_RSSI_LOG2: RegisterInfo = RegisterInfo::new("MeasuredRssiLog2", 0x0554, 0x0002, 5, RegisterAccess::ReadOnly);
pub const LBT_OFFSET: RegisterInfo = RegisterInfo::new("LbtOffset", 0x0560, 0x0004, 5, RegisterAccess::ReadWrite);
pub const LBT_CONTROL: RegisterInfo = RegisterInfo::new("LbtControl", 0x0574, 0x0004, 1, RegisterAccess::ReadWrite);
pub const RF_SYNTHESIZER_CONTROL: RegisterInfo = RegisterInfo::new("RfSynthesizerControl", 0x0588, 0x0004, 5, RegisterAccess::ReadWrite);
pub const SJC_CONTROL: RegisterInfo = RegisterInfo::new("SjcControl", 0x0600, 0x0002, 1, RegisterAccess::ReadWrite);
pub const SJC_GAIN_CONTROL: RegisterInfo = RegisterInfo::new("SjcGainControl", 0x0604, 0x0004, 1, RegisterAccess::ReadWrite);
pub const SJC_INITIAL_SETTLING_TIME: RegisterInfo = RegisterInfo::new("SjcInitialSettlingTime", 0x0608, 0x0002, 1, RegisterAccess::ReadWrite);
pub const SJC_RESIDUE_SETTLING_TIME: RegisterInfo = RegisterInfo::new("SjcResidueSettlingTime", 0x060C, 0x0002, 1, RegisterAccess::ReadWrite);
pub const SJC_CDAC_I: RegisterInfo = RegisterInfo::new("SjcCdacI", 0x0610, 0x0004, 1, RegisterAccess::ReadWrite);
pub const SJC_CDAC_Q: RegisterInfo = RegisterInfo::new("SjcCdacQ", 0x0614, 0x0004, 1, RegisterAccess::ReadWrite);
pub const SJC_RESULT_I: RegisterInfo = RegisterInfo::new("SjcResultI", 0x0618, 0x0004, 1, RegisterAccess::ReadOnly);
pub const SJC_RESULT_Q: RegisterInfo = RegisterInfo::new("SjcResultQ", 0x061C, 0x0004, 1, RegisterAccess::ReadOnly);
pub const SJC_RESIDUE_THRESHOLD: RegisterInfo = RegisterInfo::new("SjcResidueThreshold", 0x0620, 0x0002, 1, RegisterAccess::ReadWrite);
pub const INVENTORY_OP_SUMMARY: RegisterInfo = RegisterInfo::new("InventoryOpSummary", 0x0624, 0x0004, 1, RegisterAccess::ReadWrite);
pub const ANALOG_ENABLE: RegisterInfo = RegisterInfo::new("AnalogEnable", 0x0700, 0x0004, 1, RegisterAccess::ReadWrite);
pub const AGGREGATE_OP_BUFFER: RegisterInfo = RegisterInfo::new("AggregateOpBuffer", 0x0704, 0x0200, 1, RegisterAccess::ReadWrite);
pub const POWER_DROOP_COMPENSATION: RegisterInfo = RegisterInfo::new("PowerDroopCompensation", 0x0904, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LAST_TX_RAMP_UP_TIME_MS: RegisterInfo = RegisterInfo::new("LastTxRampUpTimeMs", 0x0908, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LAST_TX_RAMP_UP_LO_FREQ_KHZ: RegisterInfo = RegisterInfo::new("LastTxRampUpLoFreqKhz", 0x090C, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LAST_TX_RAMP_DOWN_TIME_MS: RegisterInfo = RegisterInfo::new("LastTxRampDownTimeMs", 0x0910, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LAST_TX_RAMP_DOWN_LO_FREQ_KHZ: RegisterInfo = RegisterInfo::new("LastTxRampDownLoFreqKhz", 0x0914, 0x0004, 1, RegisterAccess::ReadWrite);
pub const LAST_TX_RAMP_DOWN_REASON: RegisterInfo = RegisterInfo::new("LastTxRampDownReason", 0x0918, 0x0001, 1, RegisterAccess::ReadWrite);
pub const EX10_BOOT_FLAG: RegisterInfo = RegisterInfo::new("Ex10BootFlag", 0x0920, 0x0001, 1, RegisterAccess::ReadWrite);
pub const RSSI_THRESHOLD_RN16: RegisterInfo = RegisterInfo::new("RssiThresholdRn16", 0x0FFC, 0x0002, 1, RegisterAccess::ReadWrite);
pub const RSSI_THRESHOLD_EPC: RegisterInfo = RegisterInfo::new("RssiThresholdEpc", 0x0FFE, 0x0002, 1, RegisterAccess::ReadWrite);
pub const INVENTORY_ROUND_CONTROL: RegisterInfo = RegisterInfo::new("InventoryRoundControl", 0x1000, 0x0004, 1, RegisterAccess::ReadWrite);
pub const INVENTORY_ROUND_CONTROL_2: RegisterInfo = RegisterInfo::new("InventoryRoundControl_2", 0x1004, 0x0004, 1, RegisterAccess::ReadWrite);
pub const NOMINAL_STOP_TIME: RegisterInfo = RegisterInfo::new("NominalStopTime", 0x1008, 0x0002, 1, RegisterAccess::ReadWrite);
pub const EXTENDED_STOP_TIME: RegisterInfo = RegisterInfo::new("ExtendedStopTime", 0x100C, 0x0002, 1, RegisterAccess::ReadWrite);
pub const REGULATORY_STOP_TIME: RegisterInfo = RegisterInfo::new("RegulatoryStopTime", 0x1010, 0x0002, 1, RegisterAccess::ReadWrite);
pub const TX_MUTEX_TIME: RegisterInfo = RegisterInfo::new("TxMutexTime", 0x1012, 0x0002, 1, RegisterAccess::ReadWrite);
pub const GEN2_SELECT_ENABLE: RegisterInfo = RegisterInfo::new("Gen2SelectEnable", 0x1014, 0x0002, 1, RegisterAccess::ReadWrite);
pub const GEN2_ACCESS_ENABLE: RegisterInfo = RegisterInfo::new("Gen2AccessEnable", 0x1018, 0x0002, 1, RegisterAccess::ReadWrite);
pub const GEN2_AUTO_ACCESS_ENABLE: RegisterInfo = RegisterInfo::new("Gen2AutoAccessEnable", 0x101C, 0x0002, 1, RegisterAccess::ReadWrite);
pub const GEN2_OFFSETS: RegisterInfo = RegisterInfo::new("Gen2Offsets", 0x1020, 0x0001, 10, RegisterAccess::ReadWrite);
pub const GEN2_LENGTHS: RegisterInfo = RegisterInfo::new("Gen2Lengths", 0x1030, 0x0002, 10, RegisterAccess::ReadWrite);
pub const GEN2_TRANSACTION_IDS: RegisterInfo = RegisterInfo::new("Gen2TransactionIds", 0x1050, 0x0001, 10, RegisterAccess::ReadWrite);
pub const GEN2_TXN_CONTROLS: RegisterInfo = RegisterInfo::new("Gen2TxnControls", 0x1060, 0x0004, 10, RegisterAccess::ReadWrite);
pub const DROP_QUERY_CONTROL: RegisterInfo = RegisterInfo::new("DropQueryControl", 0x1090, 0x0004, 1, RegisterAccess::ReadWrite);
pub const TAG_FEATURES_CONTROL: RegisterInfo = RegisterInfo::new("TagFeaturesControl", 0x1094, 0x0001, 1, RegisterAccess::ReadWrite);
pub const GEN2_TX_BUFFER: RegisterInfo = RegisterInfo::new("Gen2TxBuffer", 0x1100, 0x0080, 1, RegisterAccess::ReadWrite);
pub const CALIBRATION_INFO: RegisterInfo = RegisterInfo::new("CalibrationInfo", 0xE800, 0x0800, 1, RegisterAccess::ReadOnly);

/// Every register in the map, in address order.
pub static ALL_REGISTERS: &[RegisterInfo] = &[
    COMMAND_RESULT,
    RESET_CAUSE,
    STATUS,
    VERSION_STRING,
    BUILD_NUMBER,
    GIT_HASH,
    TIMESTAMP,
    FREF_FREQ,
    PRODUCT_SKU,
    SERIAL_NUMBER,
    DEVICE_INFO,
    DEVICE_BUILD,
    RTL_REVISION,
    STACK_DEPTH,
    INTERRUPT_MASK,
    INTERRUPT_MASK_SET,
    INTERRUPT_MASK_CLEAR,
    INTERRUPT_STATUS,
    EVENT_FIFO_NUM_BYTES,
    EVENT_FIFO_INT_LEVEL,
    GPIO_OUTPUT_ENABLE,
    GPIO_OUTPUT_LEVEL,
    POWER_CONTROL_LOOP_AUX_ADC_CONTROL,
    POWER_CONTROL_LOOP_GAIN_DIVISOR,
    POWER_CONTROL_LOOP_MAX_ITERATIONS,
    POWER_CONTROL_LOOP_ADC_TARGET,
    POWER_CONTROL_LOOP_ADC_THRESHOLDS,
    DELAY_US,
    GPIO_OUTPUT_LEVEL_SET,
    GPIO_OUTPUT_LEVEL_CLEAR,
    GPIO_OUTPUT_ENABLE_SET,
    GPIO_OUTPUT_ENABLE_CLEAR,
    OPS_CONTROL,
    OPS_STATUS,
    HALTED_CONTROL,
    HALTED_STATUS,
    LOG_TEST_PERIOD,
    LOG_TEST_WORD_REPEAT,
    EVENT_FIFO_TEST_PERIOD,
    EVENT_FIFO_TEST_PAYLOAD_NUM_WORDS,
    LOG_SPEED,
    LOG_ENABLES,
    BER_CONTROL,
    BER_MODE,
    HPF_OVERRIDE_SETTINGS,
    AUX_ADC_CONTROL,
    AUX_ADC_RESULTS,
    AUX_DAC_CONTROL,
    AUX_DAC_SETTINGS,
    A_TEST_MUX,
    TX_FINE_GAIN,
    RX_GAIN_CONTROL,
    TX_COARSE_GAIN,
    RF_MODE,
    DC_OFFSET,
    ETSI_BURST_OFF_TIME,
    CW_IS_ON,
    MEASURE_RSSI_COUNT,
    MEASURED_RSSI_LINEAR,
    MEASURED_RSSI_LOG2,
    LBT_OFFSET,
    LBT_CONTROL,
    RF_SYNTHESIZER_CONTROL,
    SJC_CONTROL,
    SJC_GAIN_CONTROL,
    SJC_INITIAL_SETTLING_TIME,
    SJC_RESIDUE_SETTLING_TIME,
    SJC_CDAC_I,
    SJC_CDAC_Q,
    SJC_RESULT_I,
    SJC_RESULT_Q,
    SJC_RESIDUE_THRESHOLD,
    INVENTORY_OP_SUMMARY,
    ANALOG_ENABLE,
    AGGREGATE_OP_BUFFER,
    POWER_DROOP_COMPENSATION,
    LAST_TX_RAMP_UP_TIME_MS,
    LAST_TX_RAMP_UP_LO_FREQ_KHZ,
    LAST_TX_RAMP_DOWN_TIME_MS,
    LAST_TX_RAMP_DOWN_LO_FREQ_KHZ,
    LAST_TX_RAMP_DOWN_REASON,
    EX10_BOOT_FLAG,
    RSSI_THRESHOLD_RN16,
    RSSI_THRESHOLD_EPC,
    INVENTORY_ROUND_CONTROL,
    INVENTORY_ROUND_CONTROL_2,
    NOMINAL_STOP_TIME,
    EXTENDED_STOP_TIME,
    REGULATORY_STOP_TIME,
    TX_MUTEX_TIME,
    GEN2_SELECT_ENABLE,
    GEN2_ACCESS_ENABLE,
    GEN2_AUTO_ACCESS_ENABLE,
    GEN2_OFFSETS,
    GEN2_LENGTHS,
    GEN2_TRANSACTION_IDS,
    GEN2_TXN_CONTROLS,
    DROP_QUERY_CONTROL,
    TAG_FEATURES_CONTROL,
    GEN2_TX_BUFFER,
    CALIBRATION_INFO,
];
