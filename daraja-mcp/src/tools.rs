//! The Daraja tool set.
//!
//! One tool per adapter operation. Argument names are the snake_case fields
//! of the matching [`daraja::params`] type, and omitted optional arguments
//! take the same defaults.

use std::sync::Arc;

use daraja::DarajaClient;
use daraja::params::{
    AccountBalanceParams, B2bPaymentParams, B2cPaymentParams, C2bRegisterParams,
    C2bSimulateParams, GenerateQrParams, MAX_ACCOUNT_REFERENCE_LEN, MAX_MERCHANT_NAME_LEN,
    MAX_OCCASION_LEN, MAX_PUSH_AMOUNT, MAX_REF_NO_LEN, MAX_REMARKS_LEN, MAX_TRANSACTION_DESC_LEN,
    QR_SIZE, ReversalParams, StkPushParams, StkQueryParams, TransactionStatusParams,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::registry::ToolRegistry;
use crate::types::ToolDefinition;

/// `daraja_generate_token`
pub const GENERATE_TOKEN: &str = "daraja_generate_token";
/// `daraja_stk_push`
pub const STK_PUSH: &str = "daraja_stk_push";
/// `daraja_stk_query`
pub const STK_QUERY: &str = "daraja_stk_query";
/// `daraja_c2b_register`
pub const C2B_REGISTER: &str = "daraja_c2b_register";
/// `daraja_c2b_simulate`
pub const C2B_SIMULATE: &str = "daraja_c2b_simulate";
/// `daraja_b2c_payment`
pub const B2C_PAYMENT: &str = "daraja_b2c_payment";
/// `daraja_b2b_payment`
pub const B2B_PAYMENT: &str = "daraja_b2b_payment";
/// `daraja_account_balance`
pub const ACCOUNT_BALANCE: &str = "daraja_account_balance";
/// `daraja_transaction_status`
pub const TRANSACTION_STATUS: &str = "daraja_transaction_status";
/// `daraja_reversal`
pub const REVERSAL: &str = "daraja_reversal";
/// `daraja_generate_qr`
pub const GENERATE_QR: &str = "daraja_generate_qr";

/// Arguments of a tool that takes none.
#[derive(Debug, Clone, Copy, Deserialize)]
struct NoArguments {}

/// Registers `$method` of the shared client under `$definition`.
macro_rules! adapter_tool {
    ($registry:expr, $client:expr, $definition:expr, $method:ident, $params:ty) => {{
        let client = Arc::clone($client);
        $registry.register_typed($definition, move |params: $params| {
            let client = Arc::clone(&client);
            async move { client.$method(params).await }
        });
    }};
}

/// Builds a registry holding every Daraja tool.
#[must_use]
pub fn daraja_tools(client: Arc<DarajaClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_daraja_tools(&mut registry, &client);
    registry
}

/// Adds every Daraja tool to an existing registry.
pub fn register_daraja_tools(registry: &mut ToolRegistry, client: &Arc<DarajaClient>) {
    {
        let client = Arc::clone(client);
        registry.register_typed(
            ToolDefinition::new(
                GENERATE_TOKEN,
                "Perform a fresh OAuth exchange and report the new token's expiry. \
                 The token itself is never returned.",
                object(&json!({}), &[]),
            ),
            move |_: NoArguments| {
                let client = Arc::clone(&client);
                async move { client.generate_token().await }
            },
        );
    }
    adapter_tool!(registry, client, stk_push(), stk_push, StkPushParams);
    adapter_tool!(registry, client, stk_query(), stk_query, StkQueryParams);
    adapter_tool!(registry, client, c2b_register(), c2b_register, C2bRegisterParams);
    adapter_tool!(registry, client, c2b_simulate(), c2b_simulate, C2bSimulateParams);
    adapter_tool!(registry, client, b2c_payment(), b2c_payment, B2cPaymentParams);
    adapter_tool!(registry, client, b2b_payment(), b2b_payment, B2bPaymentParams);
    adapter_tool!(registry, client, account_balance(), account_balance, AccountBalanceParams);
    adapter_tool!(
        registry,
        client,
        transaction_status(),
        transaction_status,
        TransactionStatusParams
    );
    adapter_tool!(registry, client, reversal(), reverse_transaction, ReversalParams);
    adapter_tool!(registry, client, generate_qr(), generate_qr, GenerateQrParams);
}

fn object(properties: &Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn url(description: &str) -> Value {
    json!({ "type": "string", "format": "uri", "description": description })
}

fn text(description: &str, max: usize) -> Value {
    json!({ "type": "string", "maxLength": max, "description": description })
}

fn amount(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 1, "description": description })
}

fn identifier_type(default: &str, allowed: &[&str]) -> Value {
    json!({
        "type": "string",
        "enum": allowed,
        "default": default,
        "description": "1 = MSISDN, 2 = till number, 4 = short code, 11 = organization",
    })
}

fn stk_push() -> ToolDefinition {
    ToolDefinition::new(
        STK_PUSH,
        "Prompt a customer's phone to authorize a payment (M-Pesa Express).",
        object(
            &json!({
                "amount": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_PUSH_AMOUNT,
                    "description": "Amount to charge",
                },
                "phone_number": {
                    "type": "string",
                    "description": "Customer phone: 07XXXXXXXX, 01XXXXXXXX, +2547XXXXXXXX or 2547XXXXXXXX",
                },
                "callback_url": url("Receives the payment result"),
                "account_reference": text("Account reference", MAX_ACCOUNT_REFERENCE_LEN),
                "transaction_desc": text("Transaction description", MAX_TRANSACTION_DESC_LEN),
            }),
            &[
                "amount",
                "phone_number",
                "callback_url",
                "account_reference",
                "transaction_desc",
            ],
        ),
    )
}

fn stk_query() -> ToolDefinition {
    ToolDefinition::new(
        STK_QUERY,
        "Query the status of a push payment.",
        object(
            &json!({
                "checkout_request_id": {
                    "type": "string",
                    "description": "CheckoutRequestID returned by daraja_stk_push",
                },
            }),
            &["checkout_request_id"],
        ),
    )
}

fn c2b_register() -> ToolDefinition {
    ToolDefinition::new(
        C2B_REGISTER,
        "Register confirmation and validation URLs for customer-to-business payments.",
        object(
            &json!({
                "confirmation_url": url("Receives payment confirmations"),
                "validation_url": url("Receives payment validation requests"),
                "response_type": {
                    "type": "string",
                    "enum": ["Cancelled", "Completed"],
                    "default": "Completed",
                    "description": "Outcome when the validation URL is unreachable",
                },
            }),
            &["confirmation_url", "validation_url"],
        ),
    )
}

fn c2b_simulate() -> ToolDefinition {
    ToolDefinition::new(
        C2B_SIMULATE,
        "Simulate a customer-to-business payment. Sandbox only.",
        object(
            &json!({
                "amount": amount("Amount paid"),
                "msisdn": { "type": "string", "description": "Paying customer's phone" },
                "command_id": {
                    "type": "string",
                    "enum": ["PayBill", "BuyGoods"],
                    "default": "PayBill",
                },
                "bill_ref_number": { "type": "string", "description": "Bill reference" },
            }),
            &["amount", "msisdn"],
        ),
    )
}

fn b2c_payment() -> ToolDefinition {
    ToolDefinition::new(
        B2C_PAYMENT,
        "Pay a customer from the business account. Requires initiator credentials.",
        object(
            &json!({
                "amount": amount("Amount to pay"),
                "party_b": { "type": "string", "description": "Recipient phone" },
                "command_id": {
                    "type": "string",
                    "enum": ["Salary", "Business", "Promotion"],
                    "default": "Business",
                },
                "remarks": text("Remarks", MAX_REMARKS_LEN),
                "queue_timeout_url": url("Notified if the request times out"),
                "result_url": url("Receives the result"),
                "occasion": text("Occasion", MAX_OCCASION_LEN),
            }),
            &[
                "amount",
                "party_b",
                "remarks",
                "queue_timeout_url",
                "result_url",
            ],
        ),
    )
}

fn b2b_payment() -> ToolDefinition {
    ToolDefinition::new(
        B2B_PAYMENT,
        "Transfer funds to another business. Requires initiator credentials.",
        object(
            &json!({
                "amount": amount("Amount to transfer"),
                "party_b": { "type": "string", "description": "Recipient short code or till" },
                "command_id": {
                    "type": "string",
                    "enum": ["PayBill", "BuyGoods", "DisburseToBusiness", "B2BTransfer"],
                    "default": "PayBill",
                },
                "remarks": text("Remarks", MAX_REMARKS_LEN),
                "queue_timeout_url": url("Notified if the request times out"),
                "result_url": url("Receives the result"),
                "account_reference": text("Account reference", MAX_ACCOUNT_REFERENCE_LEN),
            }),
            &[
                "amount",
                "party_b",
                "remarks",
                "queue_timeout_url",
                "result_url",
                "account_reference",
            ],
        ),
    )
}

fn account_balance() -> ToolDefinition {
    ToolDefinition::new(
        ACCOUNT_BALANCE,
        "Request the business account balance. Requires initiator credentials.",
        object(
            &json!({
                "identifier_type": identifier_type("4", &["1", "2", "4"]),
                "remarks": text("Remarks", MAX_REMARKS_LEN),
                "queue_timeout_url": url("Notified if the request times out"),
                "result_url": url("Receives the balance"),
            }),
            &["remarks", "queue_timeout_url", "result_url"],
        ),
    )
}

fn transaction_status() -> ToolDefinition {
    ToolDefinition::new(
        TRANSACTION_STATUS,
        "Request the status of a transaction. Requires initiator credentials.",
        object(
            &json!({
                "transaction_id": { "type": "string", "description": "M-Pesa receipt number" },
                "identifier_type": identifier_type("4", &["1", "2", "4"]),
                "result_url": url("Receives the status"),
                "queue_timeout_url": url("Notified if the request times out"),
                "remarks": text("Remarks", MAX_REMARKS_LEN),
                "occasion": text("Occasion", MAX_OCCASION_LEN),
            }),
            &[
                "transaction_id",
                "result_url",
                "queue_timeout_url",
                "remarks",
            ],
        ),
    )
}

fn reversal() -> ToolDefinition {
    ToolDefinition::new(
        REVERSAL,
        "Reverse a completed transaction. Requires initiator credentials.",
        object(
            &json!({
                "transaction_id": { "type": "string", "description": "M-Pesa receipt number" },
                "amount": amount("Amount to reverse"),
                "receiver_party": { "type": "string", "description": "Party that received the payment" },
                "receiver_identifier_type": identifier_type("11", &["1", "2", "4", "11"]),
                "result_url": url("Receives the result"),
                "queue_timeout_url": url("Notified if the request times out"),
                "remarks": text("Remarks", MAX_REMARKS_LEN),
                "occasion": text("Occasion", MAX_OCCASION_LEN),
            }),
            &[
                "transaction_id",
                "amount",
                "receiver_party",
                "result_url",
                "queue_timeout_url",
                "remarks",
            ],
        ),
    )
}

fn generate_qr() -> ToolDefinition {
    ToolDefinition::new(
        GENERATE_QR,
        "Generate a dynamic M-Pesa payment QR code.",
        object(
            &json!({
                "merchant_name": text("Merchant name", MAX_MERCHANT_NAME_LEN),
                "ref_no": text("Transaction reference", MAX_REF_NO_LEN),
                "amount": amount("Amount"),
                "trx_code": {
                    "type": "string",
                    "enum": ["BG", "WA", "PB", "SM"],
                    "description": "BG = buy goods, WA = agent withdrawal, PB = paybill, SM = send money",
                },
                "cpi": { "type": "string", "description": "Till, paybill, agent number or phone" },
                "size": { "type": "string", "enum": [QR_SIZE], "default": QR_SIZE },
            }),
            &["merchant_name", "ref_no", "amount", "trx_code", "cpi"],
        ),
    )
}
