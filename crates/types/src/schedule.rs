use crate::{
    flow_rate_from_tokens_per_day, normalize_hex_bytes, parse_address, parse_u256, parse_u32,
    HumanAmount, InputError,
};
use alloy::primitives::{aliases::I96, Address, Bytes, U256};
use clearsig_bindings::{
    Action, IFlowScheduler712Macro::CreateFlowScheduleParams,
    IOnly712MacroForwarder::SecurityType, Security,
};
use clearsig_constants::{SECONDS_PER_DAY, SECURITY_DOMAIN, SECURITY_PROVIDER};
use serde::{Deserialize, Serialize};

/// Delay between now and the default schedule start.
const DEFAULT_START_OFFSET: u64 = 3_600;
/// Default schedule length.
const DEFAULT_DURATION: u64 = 7 * SECONDS_PER_DAY;

/// The flow a schedule creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFlowParams {
    /// Super token to stream.
    pub super_token: Address,
    /// Flow receiver.
    pub receiver: Address,
    /// Unix time the flow may start.
    pub start_date: u32,
    /// Seconds after `start_date` during which the flow may still start.
    pub start_max_delay: u32,
    /// Wei per second.
    pub flow_rate: I96,
    /// Amount transferred when the flow starts.
    pub start_amount: U256,
    /// Unix time the flow ends. Zero for open-ended.
    pub end_date: u32,
    /// Opaque data forwarded to the receiver.
    pub user_data: Bytes,
}

impl ScheduleFlowParams {
    /// Parameters for the macro's encoder.
    pub fn to_macro_params(&self) -> CreateFlowScheduleParams {
        CreateFlowScheduleParams {
            superToken: self.super_token,
            receiver: self.receiver,
            startDate: self.start_date,
            startMaxDelay: self.start_max_delay,
            flowRate: self.flow_rate,
            startAmount: self.start_amount,
            endDate: self.end_date,
            userData: self.user_data.clone(),
        }
    }

    /// The signed `Action`, using the macro-rendered `description`.
    pub fn to_action(&self, description: String) -> Action {
        Action {
            description,
            superToken: self.super_token,
            receiver: self.receiver,
            startDate: self.start_date,
            startMaxDelay: self.start_max_delay,
            flowRate: self.flow_rate,
            startAmount: self.start_amount,
            endDate: self.end_date,
            userData: self.user_data.clone(),
        }
    }
}

/// Security fields fixed before a nonce is known.
///
/// A [`ScheduleFlowSecurity`] can only be produced by attaching a nonce, so
/// each signing attempt pairs the template with a freshly fetched one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityTemplate {
    domain: String,
    provider: String,
    valid_after: U256,
    valid_before: U256,
}

impl Default for SecurityTemplate {
    fn default() -> Self {
        Self::new(SECURITY_DOMAIN.into(), SECURITY_PROVIDER.into())
    }
}

impl SecurityTemplate {
    /// A template with no validity window.
    pub const fn new(domain: String, provider: String) -> Self {
        Self { domain, provider, valid_after: U256::ZERO, valid_before: U256::ZERO }
    }

    /// Set the validity window. Zero means unbounded.
    pub const fn with_validity(mut self, valid_after: U256, valid_before: U256) -> Self {
        self.valid_after = valid_after;
        self.valid_before = valid_before;
        self
    }

    /// Get the security domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Get the security provider.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Attach a nonce.
    pub fn with_nonce(&self, nonce: U256) -> ScheduleFlowSecurity {
        ScheduleFlowSecurity {
            domain: self.domain.clone(),
            provider: self.provider.clone(),
            valid_after: self.valid_after,
            valid_before: self.valid_before,
            nonce,
        }
    }
}

/// Replay and validity constraints of one signing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFlowSecurity {
    /// Security domain.
    pub domain: String,
    /// Security provider.
    pub provider: String,
    /// Not valid before this time. Zero for unbounded.
    pub valid_after: U256,
    /// Not valid after this time. Zero for unbounded.
    pub valid_before: U256,
    /// Forwarder nonce. Never reused across signatures.
    pub nonce: U256,
}

impl ScheduleFlowSecurity {
    /// The signed `Security` struct.
    pub fn to_eip712(&self) -> Security {
        Security {
            domain: self.domain.clone(),
            provider: self.provider.clone(),
            validAfter: self.valid_after,
            validBefore: self.valid_before,
            nonce: self.nonce,
        }
    }

    /// The forwarder's ABI representation.
    pub fn to_forwarder(&self) -> SecurityType {
        SecurityType {
            domain: self.domain.clone(),
            provider: self.provider.clone(),
            validAfter: self.valid_after,
            validBefore: self.valid_before,
            nonce: self.nonce,
        }
    }
}

/// Unvalidated flow schedule input, as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleFlowForm {
    /// Super token address.
    pub super_token: String,
    /// Receiver address.
    pub receiver: String,
    /// Unix start date.
    pub start_date: String,
    /// Start window in seconds.
    pub start_max_delay: String,
    /// Decimal tokens per day.
    pub flow_rate: String,
    /// Start amount in wei.
    pub start_amount: String,
    /// Unix end date.
    pub end_date: String,
    /// Hex user data, prefix optional.
    pub user_data: String,
    /// Unix time, zero for unbounded.
    pub valid_after: String,
    /// Unix time, zero for unbounded.
    pub valid_before: String,
}

impl ScheduleFlowForm {
    /// A form with the default schedule: starting in an hour, running a
    /// week, one token per day, a one day start window.
    pub fn with_defaults(now: u64) -> Self {
        Self {
            start_date: now.saturating_add(DEFAULT_START_OFFSET).to_string(),
            start_max_delay: SECONDS_PER_DAY.to_string(),
            flow_rate: "1".into(),
            start_amount: "0".into(),
            end_date: now.saturating_add(DEFAULT_DURATION).to_string(),
            valid_after: "0".into(),
            valid_before: "0".into(),
            ..Default::default()
        }
    }

    /// Validate every field.
    pub fn parse(&self) -> Result<(ScheduleFlowParams, SecurityTemplate), InputError> {
        let rate = HumanAmount::parse(&self.flow_rate)
            .and_then(|rate| flow_rate_from_tokens_per_day(&rate))
            .map_err(|e| InputError::amount("flowRate", e))?;

        let params = ScheduleFlowParams {
            super_token: parse_address("superToken", &self.super_token)?,
            receiver: parse_address("receiver", &self.receiver)?,
            start_date: parse_u32("startDate", &self.start_date)?,
            start_max_delay: parse_u32("startMaxDelay", &self.start_max_delay)?,
            flow_rate: rate,
            start_amount: parse_u256("startAmount", &self.start_amount)?,
            end_date: parse_u32("endDate", &self.end_date)?,
            user_data: normalize_hex_bytes("userData", &self.user_data)?,
        };
        let security = SecurityTemplate::default().with_validity(
            parse_u256("validAfter", &self.valid_after)?,
            parse_u256("validBefore", &self.valid_before)?,
        );
        Ok((params, security))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AmountError;
    use clearsig_constants::test_utils::{RECEIVER, SUPER_TOKEN};

    fn form() -> ScheduleFlowForm {
        ScheduleFlowForm {
            super_token: SUPER_TOKEN.to_string(),
            receiver: RECEIVER.to_string(),
            user_data: "cafe".into(),
            ..ScheduleFlowForm::with_defaults(1_700_000_000)
        }
    }

    #[test]
    fn defaults() {
        let form = ScheduleFlowForm::with_defaults(1_700_000_000);
        assert_eq!(form.start_date, "1700003600");
        assert_eq!(form.end_date, "1700604800");
        assert_eq!(form.start_max_delay, "86400");
        assert_eq!(form.flow_rate, "1");
    }

    #[test]
    fn parses_form() {
        let (params, security) = form().parse().unwrap();
        assert_eq!(params.super_token, SUPER_TOKEN);
        assert_eq!(params.start_date, 1_700_003_600);
        assert_eq!(params.flow_rate, I96::try_from(11_574_074_074_074i64).unwrap());
        assert_eq!(params.user_data, Bytes::from_static(&[0xca, 0xfe]));
        assert_eq!(security.domain(), "flowscheduler.xyz");
        assert_eq!(security.provider(), "macros.superfluid.eth");

        let sec = security.with_nonce(U256::from(9));
        assert_eq!(sec.nonce, U256::from(9));
        assert_eq!(sec.to_eip712().nonce, sec.to_forwarder().nonce);
    }

    #[test]
    fn reports_field() {
        let bad = ScheduleFlowForm { receiver: "0x1234".into(), ..form() };
        assert_eq!(
            bad.parse().unwrap_err(),
            InputError::InvalidAddress { field: "receiver", value: "0x1234".into() }
        );

        let bad = ScheduleFlowForm { flow_rate: "-1".into(), ..form() };
        assert!(matches!(
            bad.parse().unwrap_err(),
            InputError::InvalidAmount { field: "flowRate", source: AmountError::InvalidAmount(_) }
        ));

        let bad = ScheduleFlowForm { user_data: "xyz".into(), ..form() };
        assert!(matches!(bad.parse().unwrap_err(), InputError::InvalidHex { .. }));
    }

    #[test]
    fn action_uses_given_description() {
        let (params, _) = form().parse().unwrap();
        let action = params.to_action("Create a flow".into());
        assert_eq!(action.description, "Create a flow");
        assert_eq!(action.flowRate, params.flow_rate);
        assert_eq!(params.to_macro_params().userData, params.user_data);
    }
}
