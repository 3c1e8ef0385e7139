// libex10-rs/libex10/src/registers/ops.rs

use crate::macros::wire_enum;
use crate::protocol::parser::byte_at;
use crate::Result;

wire_enum! {
    /// Device op identifiers, as written to OpsControl or embedded in an
    /// aggregate RunOp instruction.
    pub enum OpId {
        Idle = 0xa0,
        LogTestOp = 0xa1,
        MeasureAdcOp = 0xa2,
        TxRampUpOp = 0xa3,
        TxRampDownOp = 0xa4,
        SetTxCoarseGainOp = 0xa5,
        SetTxFineGainOp = 0xa6,
        RadioPowerControlOp = 0xa7,
        SetRfModeOp = 0xa8,
        SetRxGainOp = 0xa9,
        LockSynthesizerOp = 0xaa,
        EventFifoTestOp = 0xab,
        RxRunSjcOp = 0xac,
        SetGpioOp = 0xad,
        SetClearGpioPinsOp = 0xae,
        StartInventoryRoundOp = 0xb0,
        RunPrbsDataOp = 0xb1,
        SendSelectOp = 0xb2,
        SetDacOp = 0xb3,
        SetATestMuxOp = 0xb4,
        PowerControlLoopOp = 0xb5,
        MeasureRssiOp = 0xb6,
        UsTimerStartOp = 0xb7,
        UsTimerWaitOp = 0xb8,
        AggregateOp = 0xb9,
        ListenBeforeTalkOp = 0xba,
        BerTestOp = 0xc0,
        EtsiBurstOp = 0xc1,
        HpfOverrideTestOp = 0xc2,
        SetDcOffsetOp = 0xc4,
    }
}

wire_enum! {
    /// Error reported by the last op in OpsStatus.
    pub enum OpsStatus {
        ErrorNone = 0x00,
        ErrorUnknownOp = 0x01,
        ErrorUnknownError = 0x02,
        ErrorInvalidParameter = 0x03,
        ErrorPllNotLocked = 0x04,
        ErrorPowerControlTargetFailed = 0x05,
        ErrorInvalidTxState = 0x06,
        ErrorRadioPowerNotEnabled = 0x07,
        ErrorAggregateBufferOverflow = 0x08,
        ErrorAggregateInnerOpError = 0x09,
        ErrorSjcCdacRangeError = 0x0b,
        ErrorSjcResidueThresholdExceeded = 0x0c,
        ErrorDroopCompensationTooManyAdcChannels = 0x0d,
        ErrorEventFailedToSend = 0x0e,
        ErrorAggregateEx10CommandError = 0x0f,
        ErrorUnsupportedCommand = 0x10,
        ErrorBerRxHung = 0x11,
        ErrorTimeout = 0x12,
    }
}

/// OpsStatus register image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpsStatusFields {
    /// Raw op id; the device may report ids this crate does not name.
    pub op_id: u8,
    pub busy: bool,
    pub error: OpsStatus,
}

impl OpsStatusFields {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            op_id: byte_at(data, 0)?,
            busy: byte_at(data, 1)? & 0x01 != 0,
            error: OpsStatus::try_from(byte_at(data, 2)?)?,
        })
    }

    pub fn op(&self) -> Option<OpId> {
        OpId::try_from(self.op_id).ok()
    }
}
