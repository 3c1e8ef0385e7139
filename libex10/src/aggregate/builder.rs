// libex10-rs/libex10/src/aggregate/builder.rs

//! Append helpers for [`AggregateOpBuffer`].
//!
//! Every device helper is a fixed sequence of register writes followed by
//! the op that consumes them. A helper that fails part way leaves the
//! instructions it already appended in the buffer.

use log::debug;

use crate::aggregate::buffer::AggregateOpBuffer;
use crate::aggregate::instruction::AggregateOpInstruction;
use crate::constants::{AGGREGATE_OP_MAX_FIFO_PACKET_BYTES, BOOST_RAMP_DELAY_US, EVENT_PACKET_FORMAT_SHA, TX_MUTEX_TIME_US};
use crate::fifo::packet::{create_fifo_event, EventFifoPacket, PacketHeader};
use crate::registers::*;
use crate::{Error, Result};

impl AggregateOpBuffer {
    /// Write `data` starting at the first entry of `reg`.
    pub fn append_reg_write(&mut self, reg: &RegisterInfo, data: &[u8]) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::Write {
            address: reg.address,
            data: data.to_vec(),
        })
    }

    pub fn append_reset(&mut self, destination: u8) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::Reset { destination })
    }

    pub fn append_op_run(&mut self, op: OpId) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::run_op(op))
    }

    pub fn append_go_to_instruction(&mut self, jump_index: u16, repeat_counter: u8) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::GoToIndex {
            jump_index,
            repeat_counter,
        })
    }

    pub fn append_identifier(&mut self, id: u16) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::Identifier(id))
    }

    pub fn append_exit_instruction(&mut self) -> Result<()> {
        self.append_instruction(&AggregateOpInstruction::ExitInstruction)
    }

    pub fn append_host_mutex(&mut self, enable: bool) -> Result<()> {
        let instruction = if enable {
            AggregateOpInstruction::HostMutexOn
        } else {
            AggregateOpInstruction::HostMutexOff
        };
        self.append_instruction(&instruction)
    }

    /// Have the device push `packet` into its event fifo. `None` inserts a
    /// bare header with packet type 0.
    pub fn append_insert_fifo_event(
        &mut self,
        trigger_irq: bool,
        packet: Option<&EventFifoPacket>,
    ) -> Result<()> {
        let bytes = match packet {
            Some(packet) => create_fifo_event(packet)?,
            None => PacketHeader {
                packet_length: (PacketHeader::SIZE / 4) as u8,
                packet_type: 0,
                format_sha: EVENT_PACKET_FORMAT_SHA,
                us_counter: 0,
            }
            .to_bytes()
            .to_vec(),
        };
        if bytes.len() > AGGREGATE_OP_MAX_FIFO_PACKET_BYTES {
            return Err(Error::InvalidLength {
                expected: AGGREGATE_OP_MAX_FIFO_PACKET_BYTES,
                actual: bytes.len(),
            });
        }
        self.append_instruction(&AggregateOpInstruction::InsertFifoEvent {
            trigger_irq,
            packet: bytes,
        })
    }

    pub fn append_set_rf_mode(&mut self, rf_mode: u16) -> Result<()> {
        self.append_reg_write(&RF_MODE, &rf_mode.to_le_bytes())?;
        self.append_op_run(OpId::SetRfModeOp)
    }

    /// Convert `num_channels` AuxAdc inputs starting at `channel_start`. The
    /// count is clipped to the channels that exist.
    pub fn append_measure_aux_adc(&mut self, channel_start: u8, num_channels: u8) -> Result<()> {
        let enables = channel_enable_bits(channel_start, num_channels, AUX_ADC_CHANNEL_COUNT)?;
        self.append_reg_write(&AUX_ADC_CONTROL, &enables.to_le_bytes())?;
        self.append_op_run(OpId::MeasureAdcOp)
    }

    pub fn append_set_gpio(&mut self, levels: u32, enables: u32) -> Result<()> {
        self.append_reg_write(&GPIO_OUTPUT_LEVEL, &levels.to_le_bytes())?;
        self.append_reg_write(&GPIO_OUTPUT_ENABLE, &enables.to_le_bytes())?;
        self.append_op_run(OpId::SetGpioOp)
    }

    pub fn append_set_clear_gpio_pins(&mut self, pins: &GpioPinsSetClear) -> Result<()> {
        self.append_reg_write(&GPIO_OUTPUT_LEVEL_SET, &pins.to_bytes())?;
        self.append_op_run(OpId::SetClearGpioPinsOp)
    }

    /// Program every RfSynthesizerControl entry with the same dividers and
    /// lock.
    pub fn append_lock_synthesizer(&mut self, r_divider: u8, n_divider: u16) -> Result<()> {
        let image = RfSynthesizerControlFields::new(r_divider, n_divider).to_bytes();
        let data: Vec<u8> = image
            .iter()
            .copied()
            .cycle()
            .take(RF_SYNTHESIZER_CONTROL.total_len())
            .collect();
        self.append_reg_write(&RF_SYNTHESIZER_CONTROL, &data)?;
        self.append_op_run(OpId::LockSynthesizerOp)
    }

    /// SJC configuration writes only; follow with
    /// [`append_run_sjc`](Self::append_run_sjc).
    pub fn append_sjc_settings(&mut self, settings: &SjcSettings) -> Result<()> {
        let cdac = settings.cdac.to_bytes();
        self.append_reg_write(&SJC_CONTROL, &settings.control.to_bytes())?;
        self.append_reg_write(&SJC_GAIN_CONTROL, &settings.rx_gain.to_bytes())?;
        self.append_reg_write(
            &SJC_INITIAL_SETTLING_TIME,
            &settings.initial_settling_time.to_le_bytes(),
        )?;
        self.append_reg_write(
            &SJC_RESIDUE_SETTLING_TIME,
            &settings.residue_settling_time.to_le_bytes(),
        )?;
        self.append_reg_write(&SJC_CDAC_I, &cdac)?;
        self.append_reg_write(&SJC_CDAC_Q, &cdac)?;
        self.append_reg_write(
            &SJC_RESIDUE_THRESHOLD,
            &settings.residue_threshold.to_le_bytes(),
        )
    }

    pub fn append_run_sjc(&mut self) -> Result<()> {
        self.append_op_run(OpId::RxRunSjcOp)
    }

    pub fn append_set_tx_coarse_gain(&mut self, tx_atten: u8) -> Result<()> {
        self.append_reg_write(&TX_COARSE_GAIN, &TxCoarseGainFields { tx_atten }.to_bytes())?;
        self.append_op_run(OpId::SetTxCoarseGainOp)
    }

    pub fn append_set_tx_fine_gain(&mut self, tx_scalar: i16) -> Result<()> {
        self.append_reg_write(&TX_FINE_GAIN, &TxFineGainFields { tx_scalar }.to_bytes())?;
        self.append_op_run(OpId::SetTxFineGainOp)
    }

    /// Dwell timers plus the fixed tx mutex time. Register writes only.
    pub fn append_set_regulatory_timers(&mut self, timers: &RegulatoryTimers) -> Result<()> {
        self.append_reg_write(&NOMINAL_STOP_TIME, &timers.nominal_ms.to_le_bytes())?;
        self.append_reg_write(&EXTENDED_STOP_TIME, &timers.extended_ms.to_le_bytes())?;
        self.append_reg_write(&REGULATORY_STOP_TIME, &timers.regulatory_ms.to_le_bytes())?;
        self.append_reg_write(&TX_MUTEX_TIME, &TX_MUTEX_TIME_US.to_le_bytes())?;
        self.append_reg_write(&ETSI_BURST_OFF_TIME, &timers.etsi_burst_off_time_image())
    }

    pub fn append_tx_ramp_up(&mut self, dc_offset: i32) -> Result<()> {
        self.append_reg_write(&DC_OFFSET, &DcOffsetFields { offset: dc_offset }.to_bytes())?;
        self.append_op_run(OpId::TxRampUpOp)
    }

    /// Power control loop registers. Nothing is appended when the loop is
    /// disabled (`adc_target == 0`).
    fn append_power_control_settings(&mut self, power: &PowerConfigs, use_boost: bool) -> Result<()> {
        if power.adc_target == 0 {
            return Ok(());
        }
        self.append_reg_write(
            &POWER_CONTROL_LOOP_AUX_ADC_CONTROL,
            &power.aux_adc_control_image(use_boost),
        )?;
        self.append_reg_write(&POWER_CONTROL_LOOP_GAIN_DIVISOR, &power.gain_divisor_image())?;
        self.append_reg_write(
            &POWER_CONTROL_LOOP_MAX_ITERATIONS,
            &power.max_iterations_image(),
        )?;
        self.append_reg_write(
            &POWER_CONTROL_LOOP_ADC_TARGET,
            &power.adc_target_image(use_boost),
        )?;
        self.append_reg_write(
            &POWER_CONTROL_LOOP_ADC_THRESHOLDS,
            &power.adc_thresholds_image(),
        )
    }

    pub fn append_power_control(&mut self, power: &PowerConfigs) -> Result<()> {
        if power.adc_target == 0 {
            debug!("power control loop disabled");
            return Ok(());
        }
        self.append_power_control_settings(power, false)?;
        self.append_op_run(OpId::PowerControlLoopOp)
    }

    /// DC offset, loop settings, ramp up, then the loop itself when enabled.
    pub fn append_tx_ramp_up_and_power_control(&mut self, power: &PowerConfigs) -> Result<()> {
        self.append_reg_write(&DC_OFFSET, &DcOffsetFields { offset: power.dc_offset }.to_bytes())?;
        self.append_power_control_settings(power, false)?;
        self.append_op_run(OpId::TxRampUpOp)?;
        if power.adc_target != 0 {
            self.append_op_run(OpId::PowerControlLoopOp)?;
        }
        Ok(())
    }

    /// Ramp up at boosted power, hold for the boost time, then settle the
    /// loop at the nominal target.
    pub fn append_boost_tx_ramp_up(&mut self, power: &PowerConfigs) -> Result<()> {
        self.append_reg_write(&DC_OFFSET, &DcOffsetFields { offset: power.dc_offset }.to_bytes())?;
        self.append_power_control_settings(power, true)?;
        self.append_reg_write(&DELAY_US, &BOOST_RAMP_DELAY_US.to_le_bytes())?;
        self.append_op_run(OpId::TxRampUpOp)?;
        self.append_op_run(OpId::UsTimerStartOp)?;
        self.append_op_run(OpId::PowerControlLoopOp)?;
        self.append_power_control_settings(power, false)?;
        self.append_op_run(OpId::UsTimerWaitOp)?;
        self.append_op_run(OpId::PowerControlLoopOp)
    }

    pub fn append_start_log_test(&mut self, period: u32, repeat: u16) -> Result<()> {
        self.append_reg_write(&LOG_TEST_PERIOD, &period.to_le_bytes())?;
        self.append_reg_write(&LOG_TEST_WORD_REPEAT, &value_image::<4>(u32::from(repeat)))?;
        self.append_op_run(OpId::LogTestOp)
    }

    pub fn append_set_atest_mux(&mut self, muxes: [u32; 4]) -> Result<()> {
        let data: Vec<u8> = muxes.iter().flat_map(|m| m.to_le_bytes()).collect();
        self.append_reg_write(&A_TEST_MUX, &data)?;
        self.append_op_run(OpId::SetATestMuxOp)
    }

    /// Drive `values` onto consecutive AuxDac channels from `channel_start`.
    pub fn append_set_aux_dac(&mut self, channel_start: u8, values: &[u16]) -> Result<()> {
        let count = u8::try_from(values.len())
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::BadParamValue(format!("{} aux dac values", values.len())))?;
        let settings = AUX_DAC_SETTINGS.entries(channel_start, count)?;
        let enables = channel_enable_bits(channel_start, count, AUX_DAC_CHANNEL_COUNT)?;
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        self.append_reg_write(&AUX_DAC_CONTROL, &enables.to_le_bytes())?;
        self.append_reg_write(&settings, &data)?;
        self.append_op_run(OpId::SetDacOp)
    }

    pub fn append_tx_ramp_down(&mut self) -> Result<()> {
        self.append_op_run(OpId::TxRampDownOp)
    }

    pub fn append_radio_power_control(&mut self, enable: bool) -> Result<()> {
        self.append_reg_write(&ANALOG_ENABLE, &value_image::<4>(u32::from(enable)))?;
        self.append_op_run(OpId::RadioPowerControlOp)
    }

    pub fn append_set_analog_rx_config(&mut self, rx: &RxGainControlFields) -> Result<()> {
        self.append_reg_write(&RX_GAIN_CONTROL, &rx.to_bytes())?;
        self.append_op_run(OpId::SetRxGainOp)
    }

    pub fn append_measure_rssi(&mut self, rssi_count: u8) -> Result<()> {
        self.append_reg_write(&MEASURE_RSSI_COUNT, &value_image::<2>(u32::from(rssi_count)))?;
        self.append_op_run(OpId::MeasureRssiOp)
    }

    pub fn append_hpf_override_test(&mut self, hpf_mode: u8) -> Result<()> {
        self.append_reg_write(&HPF_OVERRIDE_SETTINGS, &value_image::<4>(u32::from(hpf_mode)))?;
        self.append_op_run(OpId::HpfOverrideTestOp)
    }

    /// Listen on the channel at `offset_frequency_khz` from the LO before
    /// transmitting.
    pub fn append_listen_before_talk(
        &mut self,
        r_divider: u8,
        n_divider: u16,
        offset_frequency_khz: i32,
        rssi_count: u8,
    ) -> Result<()> {
        self.append_reg_write(
            &RF_SYNTHESIZER_CONTROL,
            &RfSynthesizerControlFields::new(r_divider, n_divider).to_bytes(),
        )?;
        self.append_reg_write(&MEASURE_RSSI_COUNT, &value_image::<2>(u32::from(rssi_count)))?;
        self.append_reg_write(&LBT_OFFSET, &offset_frequency_khz.to_le_bytes())?;
        self.append_op_run(OpId::ListenBeforeTalkOp)
    }

    pub fn append_start_timer_op(&mut self, delay_us: u32) -> Result<()> {
        self.append_reg_write(&DELAY_US, &delay_us.to_le_bytes())?;
        self.append_op_run(OpId::UsTimerStartOp)
    }

    pub fn append_wait_timer_op(&mut self) -> Result<()> {
        self.append_op_run(OpId::UsTimerWaitOp)
    }

    pub fn append_start_event_fifo_test(&mut self, period: u32, num_words: u8) -> Result<()> {
        self.append_reg_write(&EVENT_FIFO_TEST_PERIOD, &period.to_le_bytes())?;
        self.append_reg_write(
            &EVENT_FIFO_TEST_PAYLOAD_NUM_WORDS,
            &value_image::<4>(u32::from(num_words)),
        )?;
        self.append_op_run(OpId::EventFifoTestOp)
    }

    /// Register writes only; the device picks the settings up on its next
    /// log.
    pub fn append_enable_sdd_logs(&mut self, enables: &LogEnablesFields, speed_mhz: u8) -> Result<()> {
        self.append_reg_write(&LOG_ENABLES, &enables.to_bytes())?;
        self.append_reg_write(&LOG_SPEED, &[speed_mhz, 0])
    }

    pub fn append_start_inventory_round(
        &mut self,
        control: &InventoryRoundControlFields,
        control_2: &InventoryRoundControl2Fields,
    ) -> Result<()> {
        self.append_reg_write(&INVENTORY_ROUND_CONTROL, &control.to_bytes())?;
        self.append_reg_write(&INVENTORY_ROUND_CONTROL_2, &control_2.to_bytes())?;
        self.append_op_run(OpId::StartInventoryRoundOp)
    }

    pub fn append_start_prbs(&mut self) -> Result<()> {
        self.append_op_run(OpId::RunPrbsDataOp)
    }

    pub fn append_start_ber_test(&mut self, num_bits: u16, num_packets: u16, delimiter_only: bool) -> Result<()> {
        let bits = num_bits.to_le_bytes();
        let packets = num_packets.to_le_bytes();
        self.append_reg_write(&BER_MODE, &[u8::from(delimiter_only)])?;
        self.append_reg_write(&BER_CONTROL, &[bits[0], bits[1], packets[0], packets[1]])?;
        self.append_op_run(OpId::BerTestOp)
    }

    /// Full transmit bring-up: both gains, regulatory timers, ramp up and
    /// the power control loop.
    pub fn append_ramp_transmit_power(
        &mut self,
        power: &PowerConfigs,
        timers: &RegulatoryTimers,
    ) -> Result<()> {
        self.append_set_tx_coarse_gain(power.tx_atten)?;
        self.append_set_tx_fine_gain(power.tx_scalar)?;
        self.append_set_regulatory_timers(timers)?;
        self.append_tx_ramp_up(power.dc_offset)?;
        self.append_power_control(power)
    }

    pub fn append_droop_compensation(&mut self, compensation: &PowerDroopCompensationFields) -> Result<()> {
        self.append_reg_write(&POWER_DROOP_COMPENSATION, &compensation.to_bytes())
    }
}
