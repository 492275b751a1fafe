//! Validation engine.
//!
//! Pure functions: every single-field check returns `Ok(value)` or a
//! human-readable message, and the step validators collect every failing
//! check into one `ValidationErrors` instead of stopping at the first.

use rvtrigger_types::draft::{ICountDraft, MControlDraft, Step1Draft};
use rvtrigger_types::error::{Field, ValidationErrors, WizardError};
use rvtrigger_types::trigger::{
    AccessType, ICountBlock, MControlBlock, PrivilegeModes, SecondaryData, TriggerControl,
    TriggerDescriptor, TriggerKind,
};

/// Largest `maskmax` value (6-bit field).
pub const MAX_MASKMAX: u8 = 63;

/// Largest `sizelo` / `sizehi` value (2-bit fields).
pub const MAX_SIZE_FIELD: u8 = 3;

/// Largest defined `action` code.
pub const MAX_ACTION: u8 = 5;

/// `action` code that enters debug mode; only legal with `dmode` set.
pub const ACTION_ENTER_DEBUG: u8 = 1;

/// Defined `match` codes (0-5 plus the negated forms 8, 9, 12, 13).
pub const MATCH_CODES: [u8; 10] = [0, 1, 2, 3, 4, 5, 8, 9, 12, 13];

/// Largest icount `count` (14-bit field).
pub const MAX_ICOUNT: u32 = (1 << 14) - 1;

pub const MODES_MESSAGE: &str = "select at least one mode (machine, supervisor, or user)";

// ---------------------------------------------------------------------------
// Single-field checks
// ---------------------------------------------------------------------------

/// Trimmed, non-empty display name.
pub fn validate_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("trigger name is required".to_string());
    }
    Ok(name.to_string())
}

/// Parse the kind selection. Does not check whether the kind is supported.
pub fn parse_kind(raw: &str) -> Result<TriggerKind, String> {
    if raw.trim().is_empty() {
        return Err("select a trigger kind".to_string());
    }
    raw.parse::<TriggerKind>()
}

/// Reject the reserved kinds.
pub fn check_kind_supported(kind: TriggerKind) -> Result<TriggerKind, String> {
    if kind.is_supported() {
        Ok(kind)
    } else {
        Err(format!("trigger kind '{kind}' is not yet supported"))
    }
}

/// At least one privilege mode must be armed.
pub fn validate_modes(modes: &PrivilegeModes) -> Result<(), String> {
    if modes.any() {
        Ok(())
    } else {
        Err(MODES_MESSAGE.to_string())
    }
}

/// Parse the access type selection. Empty and unknown values get
/// different messages.
pub fn parse_access_type(raw: &str) -> Result<AccessType, String> {
    if raw.trim().is_empty() {
        return Err("access type is required (execute, store, or load)".to_string());
    }
    raw.parse::<AccessType>().map_err(|_| {
        format!(
            "unsupported access type '{}', expected execute, store, or load",
            raw.trim()
        )
    })
}

/// Parse and normalize secondary data, then check its leading byte against
/// the access type when one is known.
pub fn validate_secondary_data(
    raw: &str,
    access: Option<AccessType>,
) -> Result<SecondaryData, String> {
    let data = SecondaryData::parse(raw).map_err(|e| e.to_string())?;
    if let Some(access) = access {
        check_secondary_prefix(&data, access)?;
    }
    Ok(data)
}

/// The leading byte of secondary data encodes the access type.
pub fn check_secondary_prefix(data: &SecondaryData, access: AccessType) -> Result<(), String> {
    let prefix = access.required_prefix();
    if data.as_str().starts_with(prefix) {
        Ok(())
    } else {
        Err(format!(
            "secondary data for {access} triggers must start with {prefix} (e.g. {}), got {data}",
            access.example_value()
        ))
    }
}

/// Coerce the count selection to an integer in `1..=MAX_ICOUNT`.
pub fn parse_count(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("count is required".to_string());
    }
    let count: i64 = trimmed
        .parse()
        .map_err(|_| format!("count must be an integer, got '{trimmed}'"))?;
    if count < 1 {
        return Err("count must be ≥ 1".to_string());
    }
    if count > i64::from(MAX_ICOUNT) {
        return Err(format!("count must be at most {MAX_ICOUNT}"));
    }
    Ok(count as u32)
}

pub fn check_action(action: u8, dmode: bool) -> Result<u8, String> {
    if action > MAX_ACTION {
        return Err(format!("action {action} is not defined (0-{MAX_ACTION})"));
    }
    if action == ACTION_ENTER_DEBUG && !dmode {
        return Err("action 1 (enter debug mode) requires dmode".to_string());
    }
    Ok(action)
}

pub fn check_match(match_mode: u8) -> Result<u8, String> {
    if MATCH_CODES.contains(&match_mode) {
        Ok(match_mode)
    } else {
        Err(format!("match {match_mode} is not a defined match code"))
    }
}

fn check_max(label: &str, value: u8, max: u8) -> Result<u8, String> {
    if value > max {
        Err(format!("{label} must be at most {max}, got {value}"))
    } else {
        Ok(value)
    }
}

fn check_mcontrol_fields(block: &MControlBlock, errors: &mut ValidationErrors) {
    errors.collect(Field::MaskMax, check_max("maskmax", block.maskmax, MAX_MASKMAX));
    errors.collect(Field::SizeLo, check_max("sizelo", block.sizelo, MAX_SIZE_FIELD));
    errors.collect(Field::SizeHi, check_max("sizehi", block.sizehi, MAX_SIZE_FIELD));
    errors.collect(Field::Match, check_match(block.match_mode));
    errors.collect(Field::Action, check_action(block.action, block.dmode));
}

// ---------------------------------------------------------------------------
// Step validators
// ---------------------------------------------------------------------------

/// Identity fields accepted by Step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub kind: TriggerKind,
    pub hart_id: Option<u32>,
}

/// Validate Step 1.
///
/// A reserved kind with an otherwise valid form is reported as
/// `UnsupportedKind`; when other fields fail too, the "not yet supported"
/// message joins the aggregated `Validation` list.
pub fn validate_step1(draft: &Step1Draft) -> Result<Identity, WizardError> {
    let mut errors = ValidationErrors::new();

    let name = errors.collect(Field::Name, validate_name(&draft.name));
    let kind = errors.collect(Field::Kind, parse_kind(&draft.kind));

    match (name, kind) {
        (Some(name), Some(kind)) if kind.is_supported() => Ok(Identity {
            name,
            kind,
            hart_id: draft.hart_id,
        }),
        (Some(_), Some(kind)) => Err(WizardError::UnsupportedKind(kind)),
        (_, kind) => {
            if let Some(kind) = kind {
                errors.collect(Field::Kind, check_kind_supported(kind));
            }
            Err(WizardError::Validation(errors))
        }
    }
}

/// Output of a successful mcontrol step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMControl {
    pub block: MControlBlock,
    pub secondary_data: SecondaryData,
    pub aux_select: Option<u32>,
    pub aux_value: Option<u32>,
}

/// Validate the mcontrol parameter step, collecting every failure.
pub fn validate_mcontrol(draft: &MControlDraft) -> Result<ValidatedMControl, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let modes = PrivilegeModes {
        machine: draft.machine,
        supervisor: draft.supervisor,
        user: draft.user,
    };
    errors.collect(Field::Modes, validate_modes(&modes));

    let access = errors.collect(Field::AccessType, parse_access_type(&draft.access_type));
    let secondary_data = errors.collect(
        Field::SecondaryData,
        validate_secondary_data(&draft.secondary_data, access),
    );

    let block = access.map(|access| MControlBlock {
        dmode: draft.dmode,
        maskmax: draft.maskmax,
        hit: false,
        select: draft.select,
        timing: draft.timing,
        sizelo: draft.sizelo,
        sizehi: draft.sizehi,
        action: draft.action,
        match_mode: draft.match_mode,
        chain: draft.chain,
        modes,
        access,
    });

    match block {
        Some(block) => {
            check_mcontrol_fields(&block, &mut errors);
            match secondary_data {
                Some(secondary_data) => errors.into_result(ValidatedMControl {
                    block,
                    secondary_data,
                    aux_select: draft.aux_select,
                    aux_value: draft.aux_value,
                }),
                None => Err(errors),
            }
        }
        None => {
            // No access type: still report the range checks on the raw fields.
            errors.collect(Field::MaskMax, check_max("maskmax", draft.maskmax, MAX_MASKMAX));
            errors.collect(Field::SizeLo, check_max("sizelo", draft.sizelo, MAX_SIZE_FIELD));
            errors.collect(Field::SizeHi, check_max("sizehi", draft.sizehi, MAX_SIZE_FIELD));
            errors.collect(Field::Match, check_match(draft.match_mode));
            errors.collect(Field::Action, check_action(draft.action, draft.dmode));
            Err(errors)
        }
    }
}

/// Validate the icount parameter step, collecting every failure.
pub fn validate_icount(draft: &ICountDraft) -> Result<ICountBlock, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let count = errors.collect(Field::Count, parse_count(&draft.count));

    let modes = PrivilegeModes {
        machine: draft.machine,
        supervisor: draft.supervisor,
        user: draft.user,
    };
    errors.collect(Field::Modes, validate_modes(&modes));
    errors.collect(Field::Action, check_action(draft.action, draft.dmode));

    match count {
        Some(count) => errors.into_result(ICountBlock {
            dmode: draft.dmode,
            hit: false,
            action: draft.action,
            count,
            modes,
        }),
        None => Err(errors),
    }
}

/// Re-check the descriptor invariants on an already-built descriptor.
///
/// Used for descriptors that did not come out of the wizard, e.g. ones
/// deserialized by the host.
pub fn validate_descriptor(descriptor: &TriggerDescriptor) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.collect(Field::Name, validate_name(&descriptor.name));
    errors.collect(Field::Modes, validate_modes(descriptor.control.modes()));

    match &descriptor.control {
        TriggerControl::MControl(block) => {
            match &descriptor.secondary_data {
                Some(data) => {
                    errors.collect(
                        Field::SecondaryData,
                        check_secondary_prefix(data, block.access),
                    );
                }
                None => errors.push(
                    Field::SecondaryData,
                    "secondary data is required for mcontrol triggers",
                ),
            }
            check_mcontrol_fields(block, &mut errors);
        }
        TriggerControl::ICount(block) => {
            errors.collect(Field::Count, parse_count(&block.count.to_string()));
            errors.collect(Field::Action, check_action(block.action, block.dmode));
            if descriptor.secondary_data.is_some() {
                errors.push(
                    Field::SecondaryData,
                    "secondary data is only valid for mcontrol triggers",
                );
            }
        }
    }

    errors.into_result(())
}
