//! Caller-facing arguments for each operation.
//!
//! These carry only what the caller decides; short codes, credentials and
//! signatures are filled in by [`DarajaClient`](crate::client::DarajaClient).
//! Every type deserializes from snake_case JSON with the documented defaults,
//! so tool dispatchers can decode arguments straight into them.
//!
//! [`validate`](StkPushParams::validate) methods run the local field checks.
//! Phone numbers are checked when the client normalizes them.

use serde::{Deserialize, Serialize};

use crate::error::DarajaError;
use crate::proto::{
    DisbursementCommand, IdentifierType, ResponseType, SimulateCommand, TransferCommand, TrxCode,
};
use crate::validate::{
    amount_within, bounded, http_url, optional_bounded, positive_amount, required,
};

/// Largest amount accepted by a push payment.
pub const MAX_PUSH_AMOUNT: u64 = 70_000;
/// Maximum length of an account reference.
pub const MAX_ACCOUNT_REFERENCE_LEN: usize = 12;
/// Maximum length of a push payment description.
pub const MAX_TRANSACTION_DESC_LEN: usize = 13;
/// Maximum length of remarks.
pub const MAX_REMARKS_LEN: usize = 100;
/// Maximum length of an occasion.
pub const MAX_OCCASION_LEN: usize = 100;
/// Maximum length of a QR merchant name.
pub const MAX_MERCHANT_NAME_LEN: usize = 22;
/// Maximum length of a QR reference number.
pub const MAX_REF_NO_LEN: usize = 12;
/// The only QR size the provider accepts.
pub const QR_SIZE: &str = "300";

/// Arguments of a push payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkPushParams {
    /// Amount, 1 to 70000.
    pub amount: u64,
    /// Customer phone number in any accepted local shape.
    pub phone_number: String,
    /// Receives the payment result.
    pub callback_url: String,
    /// Up to 12 characters.
    pub account_reference: String,
    /// Up to 13 characters.
    pub transaction_desc: String,
}

impl StkPushParams {
    /// Checks every field except the phone number.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        amount_within("amount", self.amount, MAX_PUSH_AMOUNT)?;
        http_url("callback_url", &self.callback_url)?;
        bounded(
            "account_reference",
            &self.account_reference,
            MAX_ACCOUNT_REFERENCE_LEN,
        )?;
        bounded(
            "transaction_desc",
            &self.transaction_desc,
            MAX_TRANSACTION_DESC_LEN,
        )
    }
}

/// Arguments of a push payment status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StkQueryParams {
    /// `CheckoutRequestID` returned by the push payment.
    pub checkout_request_id: String,
}

impl StkQueryParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] if the checkout request id is empty.
    pub fn validate(&self) -> Result<(), DarajaError> {
        required("checkout_request_id", &self.checkout_request_id)
    }
}

/// Arguments of a C2B URL registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct C2bRegisterParams {
    /// Receives payment confirmations.
    pub confirmation_url: String,
    /// Receives payment validation requests.
    pub validation_url: String,
    /// Defaults to `Completed`.
    #[serde(default)]
    pub response_type: ResponseType,
}

impl C2bRegisterParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] if either URL is invalid.
    pub fn validate(&self) -> Result<(), DarajaError> {
        http_url("confirmation_url", &self.confirmation_url)?;
        http_url("validation_url", &self.validation_url)
    }
}

/// Arguments of a simulated inbound payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct C2bSimulateParams {
    /// Amount, at least 1.
    pub amount: u64,
    /// Paying subscriber.
    pub msisdn: String,
    /// Defaults to `PayBill`.
    #[serde(default)]
    pub command_id: SimulateCommand,
    /// Bill reference for paybill simulations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_ref_number: Option<String>,
}

impl C2bSimulateParams {
    /// Checks every field except the phone number.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] if the amount is zero.
    pub fn validate(&self) -> Result<(), DarajaError> {
        positive_amount("amount", self.amount)
    }
}

/// Arguments of a business-to-customer disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct B2cPaymentParams {
    /// Amount, at least 1.
    pub amount: u64,
    /// Recipient phone number.
    pub party_b: String,
    /// Defaults to `Business`.
    #[serde(default)]
    pub command_id: DisbursementCommand,
    /// Up to 100 characters.
    pub remarks: String,
    /// Receives a notification if the request times out.
    pub queue_timeout_url: String,
    /// Receives the result.
    pub result_url: String,
    /// Up to 100 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl B2cPaymentParams {
    /// Checks every field except the phone number.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        positive_amount("amount", self.amount)?;
        bounded("remarks", &self.remarks, MAX_REMARKS_LEN)?;
        http_url("queue_timeout_url", &self.queue_timeout_url)?;
        http_url("result_url", &self.result_url)?;
        optional_bounded("occasion", self.occasion.as_deref(), MAX_OCCASION_LEN)
    }
}

/// Arguments of a business-to-business transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct B2bPaymentParams {
    /// Amount, at least 1.
    pub amount: u64,
    /// Recipient short code or till.
    pub party_b: String,
    /// Defaults to `PayBill`.
    #[serde(default)]
    pub command_id: TransferCommand,
    /// Up to 100 characters.
    pub remarks: String,
    /// Receives a notification if the request times out.
    pub queue_timeout_url: String,
    /// Receives the result.
    pub result_url: String,
    /// Up to 12 characters.
    pub account_reference: String,
}

impl B2bPaymentParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        positive_amount("amount", self.amount)?;
        required("party_b", &self.party_b)?;
        bounded("remarks", &self.remarks, MAX_REMARKS_LEN)?;
        http_url("queue_timeout_url", &self.queue_timeout_url)?;
        http_url("result_url", &self.result_url)?;
        bounded(
            "account_reference",
            &self.account_reference,
            MAX_ACCOUNT_REFERENCE_LEN,
        )
    }
}

const fn default_query_identifier() -> IdentifierType {
    IdentifierType::ShortCode
}

const fn default_receiver_identifier() -> IdentifierType {
    IdentifierType::Organization
}

fn query_identifier(field: &str, value: IdentifierType) -> Result<(), DarajaError> {
    if value == IdentifierType::Organization {
        return Err(DarajaError::validation(format!(
            "{field} must be one of 1, 2 or 4"
        )));
    }
    Ok(())
}

/// Arguments of an account balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceParams {
    /// Defaults to `4` (short code).
    #[serde(default = "default_query_identifier")]
    pub identifier_type: IdentifierType,
    /// Up to 100 characters.
    pub remarks: String,
    /// Receives a notification if the request times out.
    pub queue_timeout_url: String,
    /// Receives the result.
    pub result_url: String,
}

impl AccountBalanceParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        query_identifier("identifier_type", self.identifier_type)?;
        bounded("remarks", &self.remarks, MAX_REMARKS_LEN)?;
        http_url("queue_timeout_url", &self.queue_timeout_url)?;
        http_url("result_url", &self.result_url)
    }
}

/// Arguments of a transaction status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatusParams {
    /// Provider receipt number.
    pub transaction_id: String,
    /// Defaults to `4` (short code).
    #[serde(default = "default_query_identifier")]
    pub identifier_type: IdentifierType,
    /// Receives the result.
    pub result_url: String,
    /// Receives a notification if the request times out.
    pub queue_timeout_url: String,
    /// Up to 100 characters.
    pub remarks: String,
    /// Up to 100 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl TransactionStatusParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        required("transaction_id", &self.transaction_id)?;
        query_identifier("identifier_type", self.identifier_type)?;
        http_url("result_url", &self.result_url)?;
        http_url("queue_timeout_url", &self.queue_timeout_url)?;
        bounded("remarks", &self.remarks, MAX_REMARKS_LEN)?;
        optional_bounded("occasion", self.occasion.as_deref(), MAX_OCCASION_LEN)
    }
}

/// Arguments of a transaction reversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalParams {
    /// Provider receipt number of the transaction to reverse.
    pub transaction_id: String,
    /// Amount to reverse, at least 1.
    pub amount: u64,
    /// Party that received the original payment.
    pub receiver_party: String,
    /// Defaults to `11` (organization).
    #[serde(default = "default_receiver_identifier")]
    pub receiver_identifier_type: IdentifierType,
    /// Receives the result.
    pub result_url: String,
    /// Receives a notification if the request times out.
    pub queue_timeout_url: String,
    /// Up to 100 characters.
    pub remarks: String,
    /// Up to 100 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl ReversalParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        required("transaction_id", &self.transaction_id)?;
        positive_amount("amount", self.amount)?;
        required("receiver_party", &self.receiver_party)?;
        http_url("result_url", &self.result_url)?;
        http_url("queue_timeout_url", &self.queue_timeout_url)?;
        bounded("remarks", &self.remarks, MAX_REMARKS_LEN)?;
        optional_bounded("occasion", self.occasion.as_deref(), MAX_OCCASION_LEN)
    }
}

fn default_qr_size() -> String {
    QR_SIZE.to_owned()
}

/// Arguments of a dynamic QR code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateQrParams {
    /// Up to 22 characters.
    pub merchant_name: String,
    /// Up to 12 characters.
    pub ref_no: String,
    /// Amount, at least 1.
    pub amount: u64,
    /// Transaction kind.
    pub trx_code: TrxCode,
    /// Credit party identifier.
    pub cpi: String,
    /// Must be `"300"`, the default.
    #[serde(default = "default_qr_size")]
    pub size: String,
}

impl GenerateQrParams {
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DarajaError> {
        bounded("merchant_name", &self.merchant_name, MAX_MERCHANT_NAME_LEN)?;
        bounded("ref_no", &self.ref_no, MAX_REF_NO_LEN)?;
        positive_amount("amount", self.amount)?;
        required("cpi", &self.cpi)?;
        if self.size != QR_SIZE {
            return Err(DarajaError::validation(format!(
                "size must be \"{QR_SIZE}\", got \"{}\"",
                self.size
            )));
        }
        Ok(())
    }
}
