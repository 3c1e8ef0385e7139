// libex10-rs/libex10/src/registers/fields.rs

//! Typed register images.
//!
//! Each `*Fields` struct mirrors one device register and `to_bytes()`
//! produces the exact little-endian image the device expects, reserved bits
//! cleared. Groups that span several registers (`PowerConfigs`,
//! `RegulatoryTimers`, `SjcSettings`) expose one image per register.

use crate::macros::wire_enum;
use crate::{Error, Result};

/// Number of AuxAdc input channels.
pub const AUX_ADC_CHANNEL_COUNT: u8 = 15;

/// Number of AuxDac output channels.
pub const AUX_DAC_CHANNEL_COUNT: u8 = 2;

/// AuxAdc channel enable bits, one per input.
pub mod aux_adc_channel {
    pub const POWER_LO_0: u16 = 0x0001;
    pub const POWER_LO_1: u16 = 0x0002;
    pub const POWER_LO_2: u16 = 0x0004;
    pub const POWER_LO_3: u16 = 0x0008;
    pub const POWER_RX_0: u16 = 0x0010;
    pub const POWER_RX_1: u16 = 0x0020;
    pub const POWER_RX_2: u16 = 0x0040;
    pub const POWER_RX_3: u16 = 0x0080;
    pub const TEST_MUX_0: u16 = 0x0100;
    pub const TEST_MUX_1: u16 = 0x0200;
    pub const TEST_MUX_2: u16 = 0x0400;
    pub const TEST_MUX_3: u16 = 0x0800;
    pub const TEMPERATURE: u16 = 0x1000;
    pub const POWER_LO_SUM: u16 = 0x2000;
    pub const POWER_RX_SUM: u16 = 0x4000;
}

/// Enable mask for `count` consecutive channels starting at `start`, clipped
/// to `channel_count`.
pub fn channel_enable_bits(start: u8, count: u8, channel_count: u8) -> Result<u16> {
    if start >= channel_count {
        return Err(Error::BadParamValue(format!(
            "channel {} out of range (0..{})",
            start, channel_count
        )));
    }
    let count = u32::from(count.min(channel_count - start));
    Ok((((1u32 << count) - 1) << start) as u16)
}

#[inline]
fn le_image<const N: usize>(value: u64) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&value.to_le_bytes()[..N]);
    out
}

wire_enum! {
    pub enum RxAtten {
        Atten0dB = 0x00,
        Atten3dB = 0x01,
        Atten6dB = 0x02,
        Atten12dB = 0x03,
    }
}

wire_enum! {
    pub enum Pga1Gain {
        GainN6dB = 0x00,
        Gain0dB = 0x01,
        Gain6dB = 0x02,
        Gain12dB = 0x03,
    }
}

wire_enum! {
    pub enum Pga2Gain {
        Gain0dB = 0x00,
        Gain6dB = 0x01,
        Gain12dB = 0x02,
        Gain18dB = 0x03,
    }
}

wire_enum! {
    pub enum Pga3Gain {
        Gain0dB = 0x00,
        Gain6dB = 0x01,
        Gain12dB = 0x02,
        Gain18dB = 0x03,
    }
}

wire_enum! {
    pub enum MixerGain {
        Gain1p6dB = 0x00,
        Gain11p2dB = 0x01,
        Gain17p2dB = 0x02,
        Gain20p7dB = 0x03,
    }
}

/// RxGainControl: analog receive chain gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxGainControlFields {
    pub rx_atten: RxAtten,
    pub pga1_gain: Pga1Gain,
    pub pga2_gain: Pga2Gain,
    pub pga3_gain: Pga3Gain,
    pub mixer_gain: MixerGain,
    pub pga1_rin_select: bool,
    pub mixer_bandwidth: bool,
}

impl Default for RxGainControlFields {
    fn default() -> Self {
        Self {
            rx_atten: RxAtten::Atten0dB,
            pga1_gain: Pga1Gain::Gain0dB,
            pga2_gain: Pga2Gain::Gain0dB,
            pga3_gain: Pga3Gain::Gain0dB,
            mixer_gain: MixerGain::Gain1p6dB,
            pga1_rin_select: false,
            mixer_bandwidth: false,
        }
    }
}

impl RxGainControlFields {
    pub fn bits(&self) -> u16 {
        u16::from(self.rx_atten as u8)
            | u16::from(self.pga1_gain as u8) << 2
            | u16::from(self.pga2_gain as u8) << 4
            | u16::from(self.pga3_gain as u8) << 6
            | u16::from(self.mixer_gain as u8) << 10
            | u16::from(self.pga1_rin_select) << 12
            | u16::from(self.mixer_bandwidth) << 14
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        self.bits().to_le_bytes()
    }
}

/// SjcGainControl: same gain layout as RxGainControl in a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SjcGainControlFields(pub RxGainControlFields);

impl SjcGainControlFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        le_image(u64::from(self.0.bits()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxCoarseGainFields {
    /// 5 bit attenuation step.
    pub tx_atten: u8,
}

impl TxCoarseGainFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        le_image(u64::from(self.tx_atten & 0x1f))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxFineGainFields {
    pub tx_scalar: i16,
}

impl TxFineGainFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        le_image(u64::from(self.tx_scalar as u16))
    }
}

/// DcOffset: 20 bit two's complement offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DcOffsetFields {
    pub offset: i32,
}

impl DcOffsetFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        le_image(u64::from(self.offset as u32 & 0x000f_ffff))
    }
}

/// RfSynthesizerControl: PLL dividers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RfSynthesizerControlFields {
    pub n_divider: u16,
    /// 3 bit index into the R divider table.
    pub r_divider: u8,
    pub lf_type: bool,
}

impl RfSynthesizerControlFields {
    pub fn new(r_divider: u8, n_divider: u16) -> Self {
        Self {
            n_divider,
            r_divider,
            lf_type: true,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        let n = self.n_divider.to_le_bytes();
        [n[0], n[1], self.r_divider & 0x07, u8::from(self.lf_type)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SjcControlFields {
    pub sample_average_coarse: u8,
    pub sample_average_fine: u8,
    pub events_enable: bool,
    pub fixed_rx_atten: bool,
    pub decimator: u8,
}

impl SjcControlFields {
    pub fn to_bytes(&self) -> [u8; 2] {
        [
            (self.sample_average_coarse & 0x0f) | (self.sample_average_fine & 0x0f) << 4,
            u8::from(self.events_enable)
                | u8::from(self.fixed_rx_atten) << 1
                | (self.decimator & 0x07) << 2,
        ]
    }
}

/// SjcCdacI / SjcCdacQ: search window of one CDAC axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SjcCdacFields {
    pub center: i8,
    pub limit: u8,
    pub step_size: u8,
}

impl SjcCdacFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.center as u8, self.limit, self.step_size, 0]
    }
}

/// Register images written ahead of an SJC run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SjcSettings {
    pub control: SjcControlFields,
    pub rx_gain: SjcGainControlFields,
    pub initial_settling_time: u16,
    pub residue_settling_time: u16,
    /// Applied to both the I and the Q axis.
    pub cdac: SjcCdacFields,
    pub residue_threshold: u16,
}

/// InventoryRoundControl: Q algorithm and query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryRoundControlFields {
    pub initial_q: u8,
    pub max_q: u8,
    pub min_q: u8,
    pub num_min_q_cycles: u8,
    pub fixed_q: bool,
    pub q_increase_use_query: bool,
    pub q_decrease_use_query: bool,
    pub session: u8,
    pub select: u8,
    pub target: bool,
    pub halt_on_all_tags: bool,
    pub fast_id_enable: bool,
    pub tag_focus_enable: bool,
    pub auto_access: bool,
    pub abort_on_fail: bool,
    pub halt_on_fail: bool,
    pub always_ack: bool,
    pub use_tag_read_extended: bool,
}

impl InventoryRoundControlFields {
    pub fn bits(&self) -> u32 {
        u32::from(self.initial_q & 0x0f)
            | u32::from(self.max_q & 0x0f) << 4
            | u32::from(self.min_q & 0x0f) << 8
            | u32::from(self.num_min_q_cycles & 0x0f) << 12
            | u32::from(self.fixed_q) << 16
            | u32::from(self.q_increase_use_query) << 17
            | u32::from(self.q_decrease_use_query) << 18
            | u32::from(self.session & 0x03) << 19
            | u32::from(self.select & 0x03) << 21
            | u32::from(self.target) << 23
            | u32::from(self.halt_on_all_tags) << 24
            | u32::from(self.fast_id_enable) << 25
            | u32::from(self.tag_focus_enable) << 26
            | u32::from(self.auto_access) << 27
            | u32::from(self.abort_on_fail) << 28
            | u32::from(self.halt_on_fail) << 29
            | u32::from(self.always_ack) << 30
            | u32::from(self.use_tag_read_extended) << 31
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        self.bits().to_le_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryRoundControl2Fields {
    pub max_queries_since_valid_epc: u8,
    pub starting_min_q_count: u8,
    pub starting_max_queries_since_valid_epc_count: u8,
}

impl InventoryRoundControl2Fields {
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            self.max_queries_since_valid_epc,
            0,
            self.starting_min_q_count,
            self.starting_max_queries_since_valid_epc_count,
        ]
    }
}

/// LogEnables: device side SDD log categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEnablesFields {
    pub op_logs: bool,
    pub ramping_logs: bool,
    pub config_logs: bool,
    pub lmac_logs: bool,
    pub sjc_solution_logs: bool,
    pub rf_synth_logs: bool,
    pub power_control_solution_logs: bool,
    pub aux_logs: bool,
    pub regulatory_logs: bool,
    pub command_response_logs: bool,
    pub insert_fifo_event_logs: bool,
    pub host_irq_logs: bool,
    pub timer_start_logs: bool,
    pub timer_wait_logs: bool,
    pub aggregate_op_logs: bool,
    pub read_fifo_logs: bool,
    pub lbt_op_logs: bool,
}

impl LogEnablesFields {
    pub fn bits(&self) -> u32 {
        [
            self.op_logs,
            self.ramping_logs,
            self.config_logs,
            self.lmac_logs,
            self.sjc_solution_logs,
            self.rf_synth_logs,
            self.power_control_solution_logs,
            self.aux_logs,
            self.regulatory_logs,
            self.command_response_logs,
            self.insert_fifo_event_logs,
            self.host_irq_logs,
            self.timer_start_logs,
            self.timer_wait_logs,
            self.aggregate_op_logs,
            self.read_fifo_logs,
            self.lbt_op_logs,
        ]
        .iter()
        .enumerate()
        .fold(0u32, |acc, (bit, &on)| acc | u32::from(on) << bit)
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        self.bits().to_le_bytes()
    }
}

/// PowerDroopCompensation: periodic fine gain correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerDroopCompensationFields {
    pub enable: bool,
    pub compensation_interval_ms: u8,
    pub fine_gain_step_cd_b: u8,
}

impl PowerDroopCompensationFields {
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            u8::from(self.enable),
            0,
            self.compensation_interval_ms,
            self.fine_gain_step_cd_b,
        ]
    }
}

/// GPIO set/clear masks. Only pins with a set bit are changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpioPinsSetClear {
    pub output_level_set: u32,
    pub output_level_clear: u32,
    pub output_enable_set: u32,
    pub output_enable_clear: u32,
}

impl GpioPinsSetClear {
    /// Image of the four consecutive set/clear registers starting at
    /// GpioOutputLevelSet.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (chunk, value) in out.chunks_exact_mut(4).zip([
            self.output_level_set,
            self.output_level_clear,
            self.output_enable_set,
            self.output_enable_clear,
        ]) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// Transmit power calibration used by the ramp and power control helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerConfigs {
    pub tx_atten: u8,
    pub tx_scalar: i16,
    pub dc_offset: i32,
    /// Zero disables the power control loop.
    pub adc_target: u16,
    pub boost_adc_target: u16,
    pub loop_stop_threshold: u16,
    pub op_error_threshold: u16,
    pub loop_gain_divisor: u16,
    pub max_iterations: u32,
    pub power_detector_adc: u16,
    pub boost_power_detector_adc: u16,
}

impl PowerConfigs {
    pub fn aux_adc_control_image(&self, use_boost: bool) -> [u8; 4] {
        let adc = if use_boost {
            self.boost_power_detector_adc
        } else {
            self.power_detector_adc
        };
        le_image(u64::from(adc & 0x7fff))
    }

    pub fn gain_divisor_image(&self) -> [u8; 4] {
        le_image(u64::from(self.loop_gain_divisor))
    }

    pub fn max_iterations_image(&self) -> [u8; 4] {
        self.max_iterations.to_le_bytes()
    }

    pub fn adc_target_image(&self, use_boost: bool) -> [u8; 4] {
        let target = if use_boost {
            self.boost_adc_target
        } else {
            self.adc_target
        };
        le_image(u64::from(target))
    }

    pub fn adc_thresholds_image(&self) -> [u8; 4] {
        let stop = self.loop_stop_threshold.to_le_bytes();
        let error = self.op_error_threshold.to_le_bytes();
        [stop[0], stop[1], error[0], error[1]]
    }
}

/// Dwell limits of the regulatory region, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegulatoryTimers {
    pub nominal_ms: u16,
    pub extended_ms: u16,
    pub regulatory_ms: u16,
    pub off_same_channel_ms: u16,
}

impl RegulatoryTimers {
    pub fn etsi_burst_off_time_image(&self) -> [u8; 4] {
        le_image(u64::from(self.off_same_channel_ms))
    }
}

/// Image of a register holding a single unsigned value in its low bits.
pub fn value_image<const N: usize>(value: u32) -> [u8; N] {
    le_image(u64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_enable_bits_clips_to_range() {
        assert_eq!(channel_enable_bits(0, 1, AUX_ADC_CHANNEL_COUNT).unwrap(), 0x0001);
        assert_eq!(channel_enable_bits(2, 3, AUX_ADC_CHANNEL_COUNT).unwrap(), 0x001c);
        assert_eq!(channel_enable_bits(13, 10, AUX_ADC_CHANNEL_COUNT).unwrap(), 0x6000);
        assert_eq!(channel_enable_bits(0, 15, AUX_ADC_CHANNEL_COUNT).unwrap(), 0x7fff);
        assert!(channel_enable_bits(15, 1, AUX_ADC_CHANNEL_COUNT).is_err());
        assert_eq!(
            channel_enable_bits(1, 1, AUX_DAC_CHANNEL_COUNT).unwrap(),
            0x0002
        );
    }

    #[test]
    fn synthesizer_image() {
        let f = RfSynthesizerControlFields::new(0x0a, 0x1234);
        // r divider keeps only 3 bits
        assert_eq!(f.to_bytes(), [0x34, 0x12, 0x02, 0x01]);
    }

    #[test]
    fn dc_offset_is_twenty_bits() {
        assert_eq!(DcOffsetFields { offset: -1 }.to_bytes(), [0xff, 0xff, 0x0f, 0x00]);
        assert_eq!(DcOffsetFields { offset: 0x123 }.to_bytes(), [0x23, 0x01, 0, 0]);
    }

    #[test]
    fn gain_images() {
        assert_eq!(TxCoarseGainFields { tx_atten: 10 }.to_bytes(), [10, 0, 0, 0]);
        assert_eq!(TxCoarseGainFields { tx_atten: 0xff }.to_bytes(), [0x1f, 0, 0, 0]);
        assert_eq!(TxFineGainFields { tx_scalar: -2 }.to_bytes(), [0xfe, 0xff, 0, 0]);
    }

    #[test]
    fn rx_gain_layout() {
        let f = RxGainControlFields {
            rx_atten: RxAtten::Atten12dB,
            pga1_gain: Pga1Gain::Gain0dB,
            pga2_gain: Pga2Gain::Gain12dB,
            pga3_gain: Pga3Gain::Gain6dB,
            mixer_gain: MixerGain::Gain20p7dB,
            pga1_rin_select: true,
            mixer_bandwidth: true,
        };
        // 11 | 01<<2 | 10<<4 | 01<<6 | 11<<10 | 1<<12 | 1<<14
        assert_eq!(f.bits(), 0x5c67);
        assert_eq!(SjcGainControlFields(f).to_bytes(), [0x67, 0x5c, 0, 0]);
    }

    #[test]
    fn inventory_round_control_layout() {
        let f = InventoryRoundControlFields {
            initial_q: 4,
            max_q: 15,
            min_q: 0,
            num_min_q_cycles: 1,
            session: 2,
            select: 3,
            target: true,
            use_tag_read_extended: true,
            ..Default::default()
        };
        assert_eq!(
            f.bits(),
            0x04u32 | 0xf0 | 0x1000 | 2 << 19 | 3 << 21 | 1 << 23 | 1 << 31
        );
    }

    #[test]
    fn log_enables_bit_order() {
        let f = LogEnablesFields {
            op_logs: true,
            aggregate_op_logs: true,
            lbt_op_logs: true,
            ..Default::default()
        };
        assert_eq!(f.bits(), 0x0001_4001);
    }

    #[test]
    fn power_config_images() {
        let p = PowerConfigs {
            adc_target: 0x0200,
            boost_adc_target: 0x0300,
            loop_stop_threshold: 5,
            op_error_threshold: 20,
            power_detector_adc: 0x0004,
            boost_power_detector_adc: 0x0008,
            ..Default::default()
        };
        assert_eq!(p.adc_target_image(false), [0x00, 0x02, 0, 0]);
        assert_eq!(p.adc_target_image(true), [0x00, 0x03, 0, 0]);
        assert_eq!(p.aux_adc_control_image(true), [0x08, 0, 0, 0]);
        assert_eq!(p.adc_thresholds_image(), [5, 0, 20, 0]);
    }

    #[test]
    fn gpio_set_clear_image() {
        let g = GpioPinsSetClear {
            output_level_set: 0x01,
            output_level_clear: 0x02,
            output_enable_set: 0x03,
            output_enable_clear: 0x0400_0000,
        };
        assert_eq!(
            g.to_bytes(),
            [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 4]
        );
    }
}
