//! Wire format types for the Daraja API.
//!
//! Request payloads use the provider's PascalCase field names verbatim
//! (including its `CallBackURL`, `QueueTimeOutURL` and `RecieverIdentifierType`
//! spellings). Each payload implements [`OperationRequest`], which ties it to
//! its [`Operation`] and typed response.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::endpoint::Operation;
use crate::error::DarajaError;
use crate::phone::NormalizedPhone;
use crate::timestamp::Timestamp;

/// A request payload for one provider operation.
pub trait OperationRequest: Serialize + Send + Sync {
    /// The operation this payload is sent to.
    const OPERATION: Operation;
    /// The decoded success response.
    type Response: DeserializeOwned + Send;
}

/// A credential carried in a payload. Serialized as-is, never printed.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// Response of the OAuth client-credentials exchange.
///
/// The provider sends `expires_in` as a string (`"3599"`); a number is
/// accepted too.
#[serde_as]
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token value.
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub expires_in: u64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Outcome of a forced token exchange. The token value stays inside the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Lifetime reported by the provider, in seconds.
    pub expires_in: u64,
    /// Absolute expiry instant.
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Provider `CommandID` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    /// Push payment and paybill simulation.
    CustomerPayBillOnline,
    /// Till simulation.
    CustomerBuyGoodsOnline,
    /// Salary disbursement.
    SalaryPayment,
    /// Business disbursement.
    BusinessPayment,
    /// Promotional disbursement.
    PromotionPayment,
    /// Transfer to a paybill.
    BusinessPayBill,
    /// Transfer to a till.
    BusinessBuyGoods,
    /// Transfer to a business disbursement account.
    DisburseFundsToBusiness,
    /// Transfer between business accounts.
    BusinessToBusinessTransfer,
    /// Balance query.
    AccountBalance,
    /// Status query.
    TransactionStatusQuery,
    /// Reversal.
    TransactionReversal,
}

/// Command for a simulated inbound payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulateCommand {
    /// `CustomerPayBillOnline`
    #[default]
    #[serde(alias = "CustomerPayBillOnline")]
    PayBill,
    /// `CustomerBuyGoodsOnline`
    #[serde(alias = "CustomerBuyGoodsOnline")]
    BuyGoods,
}

impl SimulateCommand {
    /// Returns the provider command.
    #[must_use]
    pub const fn command_id(self) -> CommandId {
        match self {
            Self::PayBill => CommandId::CustomerPayBillOnline,
            Self::BuyGoods => CommandId::CustomerBuyGoodsOnline,
        }
    }
}

/// Command for a business-to-customer disbursement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisbursementCommand {
    /// `SalaryPayment`
    #[serde(alias = "SalaryPayment")]
    Salary,
    /// `BusinessPayment`
    #[default]
    #[serde(alias = "BusinessPayment")]
    Business,
    /// `PromotionPayment`
    #[serde(alias = "PromotionPayment")]
    Promotion,
}

impl DisbursementCommand {
    /// Returns the provider command.
    #[must_use]
    pub const fn command_id(self) -> CommandId {
        match self {
            Self::Salary => CommandId::SalaryPayment,
            Self::Business => CommandId::BusinessPayment,
            Self::Promotion => CommandId::PromotionPayment,
        }
    }
}

/// Command for a business-to-business transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransferCommand {
    /// `BusinessPayBill`
    #[default]
    #[serde(alias = "BusinessPayBill")]
    PayBill,
    /// `BusinessBuyGoods`
    #[serde(alias = "BusinessBuyGoods")]
    BuyGoods,
    /// `DisburseFundsToBusiness`
    #[serde(alias = "DisburseFundsToBusiness")]
    DisburseToBusiness,
    /// `BusinessToBusinessTransfer`
    #[serde(alias = "BusinessToBusinessTransfer")]
    B2BTransfer,
}

impl TransferCommand {
    /// Returns the provider command.
    #[must_use]
    pub const fn command_id(self) -> CommandId {
        match self {
            Self::PayBill => CommandId::BusinessPayBill,
            Self::BuyGoods => CommandId::BusinessBuyGoods,
            Self::DisburseToBusiness => CommandId::DisburseFundsToBusiness,
            Self::B2BTransfer => CommandId::BusinessToBusinessTransfer,
        }
    }
}

/// How the provider treats inbound payments when the validation URL is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResponseType {
    /// Reject the payment.
    Cancelled,
    /// Accept the payment.
    #[default]
    Completed,
}

/// Kind of party identifier.
///
/// Serialized as the provider's numeric code in a string (`"4"`). Deserializes
/// from the code as a string or number, or from the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    /// `1`: mobile number.
    Msisdn,
    /// `2`: till number.
    Till,
    /// `4`: organization short code.
    ShortCode,
    /// `11`: organization (reversals only).
    Organization,
}

impl IdentifierType {
    /// Returns the provider code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Msisdn => "1",
            Self::Till => "2",
            Self::ShortCode => "4",
            Self::Organization => "11",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for IdentifierType {
    type Err = DarajaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "msisdn" => Ok(Self::Msisdn),
            "2" | "till" => Ok(Self::Till),
            "4" | "shortcode" => Ok(Self::ShortCode),
            "11" | "organization" => Ok(Self::Organization),
            other => Err(DarajaError::validation(format!(
                "unknown identifier type '{other}', expected 1, 2, 4 or 11"
            ))),
        }
    }
}

impl Serialize for IdentifierType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for IdentifierType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u64),
            Text(String),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Code(code) => code.to_string(),
            Raw::Text(text) => text,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// QR transaction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrxCode {
    /// Pay merchant (buy goods).
    #[serde(rename = "BG")]
    BuyGoods,
    /// Withdraw cash at agent till.
    #[serde(rename = "WA")]
    WithdrawAgent,
    /// Paybill.
    #[serde(rename = "PB")]
    PayBill,
    /// Send money to a mobile number.
    #[serde(rename = "SM")]
    SendMoney,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Signed push payment (`/mpesa/stkpush/v1/processrequest`).
#[derive(Debug, Clone, Serialize)]
pub struct PushPaymentRequest {
    /// Paybill or till short code receiving the payment.
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    /// `base64(short_code + pass_key + timestamp)`.
    #[serde(rename = "Password")]
    pub password: Secret,
    /// Timestamp the password was derived from.
    #[serde(rename = "Timestamp")]
    pub timestamp: Timestamp,
    /// Always `CustomerPayBillOnline`.
    #[serde(rename = "TransactionType")]
    pub transaction_type: CommandId,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Debited party.
    #[serde(rename = "PartyA")]
    pub party_a: NormalizedPhone,
    /// Credited party.
    #[serde(rename = "PartyB")]
    pub party_b: String,
    /// Number receiving the payment prompt.
    #[serde(rename = "PhoneNumber")]
    pub phone_number: NormalizedPhone,
    /// Receives the asynchronous payment result.
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    /// Account reference shown to the customer.
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    /// Short description of the payment.
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

impl OperationRequest for PushPaymentRequest {
    const OPERATION: Operation = Operation::StkPush;
    type Response = PushPaymentResponse;
}

/// Signed push payment status query.
#[derive(Debug, Clone, Serialize)]
pub struct PushQueryRequest {
    /// Paybill or till short code receiving the payment.
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    /// `base64(short_code + pass_key + timestamp)`.
    #[serde(rename = "Password")]
    pub password: Secret,
    /// Timestamp the password was derived from.
    #[serde(rename = "Timestamp")]
    pub timestamp: Timestamp,
    /// Checkout request identifier issued by the push payment.
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
}

impl OperationRequest for PushQueryRequest {
    const OPERATION: Operation = Operation::StkQuery;
    type Response = PushQueryResponse;
}

/// C2B confirmation and validation URL registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUrlsRequest {
    /// Short code the URLs or payment apply to.
    #[serde(rename = "ShortCode")]
    pub short_code: String,
    /// Behaviour when the validation URL is unreachable.
    #[serde(rename = "ResponseType")]
    pub response_type: ResponseType,
    /// Receives payment confirmations.
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,
    /// Receives payment validation requests.
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

impl OperationRequest for RegisterUrlsRequest {
    const OPERATION: Operation = Operation::C2bRegister;
    type Response = Acknowledgement;
}

/// Simulated inbound customer payment.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateInboundRequest {
    /// Short code the URLs or payment apply to.
    #[serde(rename = "ShortCode")]
    pub short_code: String,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Paying subscriber.
    #[serde(rename = "Msisdn")]
    pub msisdn: NormalizedPhone,
    /// Bill reference, for paybill simulations.
    #[serde(rename = "BillRefNumber", skip_serializing_if = "Option::is_none")]
    pub bill_ref_number: Option<String>,
}

impl OperationRequest for SimulateInboundRequest {
    const OPERATION: Operation = Operation::C2bSimulate;
    type Response = Acknowledgement;
}

/// Business-to-customer disbursement.
#[derive(Debug, Clone, Serialize)]
pub struct DisbursementRequest {
    /// Initiator user name.
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    /// Initiator credential.
    #[serde(rename = "SecurityCredential")]
    pub security_credential: Secret,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Debited party.
    #[serde(rename = "PartyA")]
    pub party_a: String,
    /// Credited party.
    #[serde(rename = "PartyB")]
    pub party_b: NormalizedPhone,
    /// Free-text remarks.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Receives a notification if the request times out in the provider queue.
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    /// Receives the asynchronous result.
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    /// Optional free-text occasion.
    #[serde(rename = "Occasion", skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl OperationRequest for DisbursementRequest {
    const OPERATION: Operation = Operation::B2cPayment;
    type Response = Acknowledgement;
}

/// Business-to-business transfer.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessTransferRequest {
    /// Initiator user name.
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    /// Initiator credential.
    #[serde(rename = "SecurityCredential")]
    pub security_credential: Secret,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Debited party.
    #[serde(rename = "PartyA")]
    pub party_a: String,
    /// Credited party.
    #[serde(rename = "PartyB")]
    pub party_b: String,
    /// Free-text remarks.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Receives a notification if the request times out in the provider queue.
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    /// Receives the asynchronous result.
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    /// Account reference shown to the customer.
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
}

impl OperationRequest for BusinessTransferRequest {
    const OPERATION: Operation = Operation::B2bPayment;
    type Response = Acknowledgement;
}

/// Account balance query.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceQueryRequest {
    /// Initiator user name.
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    /// Initiator credential.
    #[serde(rename = "SecurityCredential")]
    pub security_credential: Secret,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Debited party.
    #[serde(rename = "PartyA")]
    pub party_a: String,
    /// Kind of identifier in `PartyA`.
    #[serde(rename = "IdentifierType")]
    pub identifier_type: IdentifierType,
    /// Free-text remarks.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Receives a notification if the request times out in the provider queue.
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    /// Receives the asynchronous result.
    #[serde(rename = "ResultURL")]
    pub result_url: String,
}

impl OperationRequest for BalanceQueryRequest {
    const OPERATION: Operation = Operation::AccountBalance;
    type Response = Acknowledgement;
}

/// Transaction status query.
#[derive(Debug, Clone, Serialize)]
pub struct StatusQueryRequest {
    /// Initiator user name.
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    /// Initiator credential.
    #[serde(rename = "SecurityCredential")]
    pub security_credential: Secret,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Provider receipt number of the transaction.
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    /// Debited party.
    #[serde(rename = "PartyA")]
    pub party_a: String,
    /// Kind of identifier in `PartyA`.
    #[serde(rename = "IdentifierType")]
    pub identifier_type: IdentifierType,
    /// Receives the asynchronous result.
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    /// Receives a notification if the request times out in the provider queue.
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    /// Free-text remarks.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Optional free-text occasion.
    #[serde(rename = "Occasion", skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl OperationRequest for StatusQueryRequest {
    const OPERATION: Operation = Operation::TransactionStatus;
    type Response = Acknowledgement;
}

/// Transaction reversal.
#[derive(Debug, Clone, Serialize)]
pub struct ReversalRequest {
    /// Initiator user name.
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    /// Initiator credential.
    #[serde(rename = "SecurityCredential")]
    pub security_credential: Secret,
    /// Provider command.
    #[serde(rename = "CommandID")]
    pub command_id: CommandId,
    /// Provider receipt number of the transaction.
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Party that received the original payment.
    #[serde(rename = "ReceiverParty")]
    pub receiver_party: String,
    /// Kind of identifier in `ReceiverParty`.
    #[serde(rename = "RecieverIdentifierType")]
    pub receiver_identifier_type: IdentifierType,
    /// Receives the asynchronous result.
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    /// Receives a notification if the request times out in the provider queue.
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_timeout_url: String,
    /// Free-text remarks.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Optional free-text occasion.
    #[serde(rename = "Occasion", skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
}

impl OperationRequest for ReversalRequest {
    const OPERATION: Operation = Operation::Reversal;
    type Response = Acknowledgement;
}

/// Dynamic QR code generation.
#[derive(Debug, Clone, Serialize)]
pub struct QrRequest {
    /// Merchant name printed on the code.
    #[serde(rename = "MerchantName")]
    pub merchant_name: String,
    /// Transaction reference.
    #[serde(rename = "RefNo")]
    pub ref_no: String,
    /// Amount in whole shillings.
    #[serde(rename = "Amount")]
    pub amount: u64,
    /// Transaction kind.
    #[serde(rename = "TrxCode")]
    pub trx_code: TrxCode,
    /// Credit party identifier: till, paybill, agent number or phone.
    #[serde(rename = "CPI")]
    pub cpi: String,
    /// Image size in pixels. Always `300`.
    #[serde(rename = "Size")]
    pub size: String,
}

impl OperationRequest for QrRequest {
    const OPERATION: Operation = Operation::GenerateQr;
    type Response = QrCodeResponse;
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Synchronous acknowledgement of a push payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPaymentResponse {
    /// Merchant request identifier.
    #[serde(rename = "MerchantRequestID", default, skip_serializing_if = "Option::is_none")]
    pub merchant_request_id: Option<String>,
    /// Checkout request identifier issued by the push payment.
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    /// `0` when the request was accepted.
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription", default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    /// Message shown to the customer.
    #[serde(rename = "CustomerMessage", default, skip_serializing_if = "Option::is_none")]
    pub customer_message: Option<String>,
}

/// Status of a push payment.
///
/// `ResultCode` is `0` on success and non-zero for failure, timeout or
/// cancellation by the customer. It arrives as a string or a number.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushQueryResponse {
    /// `0` when the request was accepted.
    #[serde(rename = "ResponseCode", default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription", default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    /// Merchant request identifier.
    #[serde(rename = "MerchantRequestID", default, skip_serializing_if = "Option::is_none")]
    pub merchant_request_id: Option<String>,
    /// Checkout request identifier issued by the push payment.
    #[serde(rename = "CheckoutRequestID", default, skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
    /// Final result code.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "ResultCode", default, skip_serializing_if = "Option::is_none")]
    pub result_code: Option<i64>,
    /// Description of the result code.
    #[serde(rename = "ResultDesc", default, skip_serializing_if = "Option::is_none")]
    pub result_desc: Option<String>,
}

/// Synchronous acknowledgement of an asynchronous request.
///
/// The final outcome is delivered later to the result URL supplied with the
/// request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Provider conversation identifier.
    #[serde(rename = "ConversationID", default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Originator conversation identifier.
    #[serde(
        rename = "OriginatorConversationID",
        alias = "OriginatorCoversationID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub originator_conversation_id: Option<String>,
    /// `0` when the request was accepted.
    #[serde(rename = "ResponseCode", default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription", default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
}

/// Generated QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeResponse {
    /// `0` when the request was accepted.
    #[serde(rename = "ResponseCode", default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    /// Request identifier.
    #[serde(rename = "RequestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription", default, skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    /// Base64-encoded PNG.
    #[serde(rename = "QRCode", default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}
