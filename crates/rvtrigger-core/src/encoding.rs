//! `tdata1` / `tdata2` register encoding.
//!
//! Packs a validated control block into the register words of the RISC-V
//! debug specification (0.13.2 layout). Writing the words to a target is
//! the host's business; this module only computes them.
//!
//! | field   | mcontrol            | icount        |
//! |---------|---------------------|---------------|
//! | type    | XLEN-1..XLEN-4      | XLEN-1..XLEN-4|
//! | dmode   | XLEN-5              | XLEN-5        |
//! | maskmax | XLEN-6..XLEN-11     |               |
//! | sizehi  | 22..21 (RV64 only)  |               |
//! | hit     | 20                  | 24            |
//! | count   |                     | 23..10        |
//! | select  | 19                  |               |
//! | timing  | 18                  |               |
//! | sizelo  | 17..16              |               |
//! | action  | 15..12              | 5..0          |
//! | chain   | 11                  |               |
//! | match   | 10..7               |               |
//! | m s u   | 6, 4, 3             | 9, 7, 6       |
//! | x/s/l   | 2, 1, 0             |               |

use rvtrigger_types::config::Xlen;
use rvtrigger_types::trigger::{
    AccessType, ICountBlock, MControlBlock, TriggerControl, TriggerDescriptor, TriggerKind,
};

/// Errors raised when a block cannot be represented for the target width.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("sizehi {0} cannot be encoded on rv32")]
    SizeHiOnRv32(u8),
}

/// Register words for one trigger slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedTrigger {
    pub tdata1: u64,
    /// Comparison value; `None` for kinds without one.
    pub tdata2: Option<u64>,
}

fn bit(flag: bool, pos: u32) -> u64 {
    u64::from(flag) << pos
}

fn field(value: u64, width: u32, pos: u32) -> u64 {
    (value & ((1 << width) - 1)) << pos
}

fn header(kind: TriggerKind, dmode: bool, xlen: Xlen) -> u64 {
    let bits = xlen.bits();
    field(u64::from(kind.tdata1_type()), 4, bits - 4) | bit(dmode, bits - 5)
}

pub fn encode_mcontrol(block: &MControlBlock, xlen: Xlen) -> Result<u64, EncodeError> {
    if xlen == Xlen::Rv32 && block.sizehi != 0 {
        return Err(EncodeError::SizeHiOnRv32(block.sizehi));
    }

    let bits = xlen.bits();
    let mut word = header(TriggerKind::MControl, block.dmode, xlen)
        | field(u64::from(block.maskmax), 6, bits - 11)
        | bit(block.hit, 20)
        | bit(block.select, 19)
        | bit(block.timing, 18)
        | field(u64::from(block.sizelo), 2, 16)
        | field(u64::from(block.action), 4, 12)
        | bit(block.chain, 11)
        | field(u64::from(block.match_mode), 4, 7)
        | bit(block.modes.machine, 6)
        | bit(block.modes.supervisor, 4)
        | bit(block.modes.user, 3)
        | bit(block.access == AccessType::Execute, 2)
        | bit(block.access == AccessType::Store, 1)
        | bit(block.access == AccessType::Load, 0);

    if xlen == Xlen::Rv64 {
        word |= field(u64::from(block.sizehi), 2, 21);
    }
    Ok(word)
}

pub fn encode_icount(block: &ICountBlock, xlen: Xlen) -> u64 {
    header(TriggerKind::ICount, block.dmode, xlen)
        | bit(block.hit, 24)
        | field(u64::from(block.count), 14, 10)
        | bit(block.modes.machine, 9)
        | bit(block.modes.supervisor, 7)
        | bit(block.modes.user, 6)
        | field(u64::from(block.action), 6, 0)
}

pub fn encode_tdata1(control: &TriggerControl, xlen: Xlen) -> Result<u64, EncodeError> {
    match control {
        TriggerControl::MControl(block) => encode_mcontrol(block, xlen),
        TriggerControl::ICount(block) => Ok(encode_icount(block, xlen)),
    }
}

/// Encode every register word a descriptor defines.
pub fn encode_descriptor(
    descriptor: &TriggerDescriptor,
    xlen: Xlen,
) -> Result<EncodedTrigger, EncodeError> {
    Ok(EncodedTrigger {
        tdata1: encode_tdata1(&descriptor.control, xlen)?,
        tdata2: descriptor
            .secondary_data
            .as_ref()
            .map(|data| u64::from(data.value())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvtrigger_types::trigger::{PrivilegeModes, SecondaryData, TriggerId};

    fn user_only() -> PrivilegeModes {
        PrivilegeModes {
            machine: false,
            supervisor: false,
            user: true,
        }
    }

    fn plain_mcontrol(access: AccessType) -> MControlBlock {
        MControlBlock {
            dmode: false,
            maskmax: 0,
            hit: false,
            select: false,
            timing: false,
            sizelo: 0,
            sizehi: 0,
            action: 0,
            match_mode: 0,
            chain: false,
            modes: user_only(),
            access,
        }
    }

    #[test]
    fn test_mcontrol_rv32_minimal() {
        let word = encode_mcontrol(&plain_mcontrol(AccessType::Load), Xlen::Rv32).unwrap();
        assert_eq!(word, 0x2000_0009);
    }

    #[test]
    fn test_mcontrol_rv64_all_fields() {
        let block = MControlBlock {
            dmode: true,
            maskmax: 5,
            hit: false,
            select: true,
            timing: true,
            sizelo: 3,
            sizehi: 1,
            action: 1,
            match_mode: 0,
            chain: true,
            modes: PrivilegeModes {
                machine: true,
                supervisor: true,
                user: true,
            },
            access: AccessType::Execute,
        };
        let word = encode_mcontrol(&block, Xlen::Rv64).unwrap();
        assert_eq!(word, 0x28A0_0000_002F_185C);
    }

    #[test]
    fn test_mcontrol_sizehi_rejected_on_rv32() {
        let mut block = plain_mcontrol(AccessType::Store);
        block.sizehi = 2;
        assert_eq!(
            encode_mcontrol(&block, Xlen::Rv32),
            Err(EncodeError::SizeHiOnRv32(2))
        );
    }

    #[test]
    fn test_icount_rv32() {
        let block = ICountBlock {
            dmode: false,
            hit: false,
            action: 0,
            count: 3,
            modes: PrivilegeModes {
                machine: true,
                supervisor: false,
                user: false,
            },
        };
        assert_eq!(encode_icount(&block, Xlen::Rv32), 0x3000_0E00);
    }

    #[test]
    fn test_encode_descriptor_includes_tdata2() {
        let descriptor = TriggerDescriptor {
            id: TriggerId::new(),
            name: "WP1".to_string(),
            enabled: true,
            hart_id: None,
            control: TriggerControl::MControl(plain_mcontrol(AccessType::Load)),
            secondary_data: Some(SecondaryData::parse("0x00000004").unwrap()),
            aux_select: None,
            aux_value: None,
        };
        let encoded = encode_descriptor(&descriptor, Xlen::Rv32).unwrap();
        assert_eq!(encoded.tdata1, 0x2000_0009);
        assert_eq!(encoded.tdata2, Some(4));
    }
}
