//! The operation client.
//!
//! [`DarajaClient`] issues every provider operation. Each call follows the
//! same sequence:
//!
//! 1. reject the call if the environment forbids it (simulation is sandbox-only)
//! 2. normalize phone parties and run the local field checks
//! 3. require initiator credentials for privileged operations
//! 4. sign the request for the push payment family
//! 5. obtain a valid bearer token from the [`TokenManager`]
//! 6. POST the payload and classify the response
//!
//! Steps 1 to 4 never touch the network, so a failure there is always a
//! [`DarajaError::Validation`] or [`DarajaError::Configuration`].
//!
//! The client holds no per-call state and every operation takes `&self`, so
//! one instance can be shared behind an [`Arc`] by any number of tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::config::{ClientConfig, Environment, InitiatorCredentials};
use crate::endpoint::{EndpointResolver, Operation};
use crate::error::{DarajaError, classify_response};
use crate::params::{
    AccountBalanceParams, B2bPaymentParams, B2cPaymentParams, C2bRegisterParams,
    C2bSimulateParams, GenerateQrParams, ReversalParams, StkPushParams, StkQueryParams,
    TransactionStatusParams,
};
use crate::phone::normalize;
use crate::proto::{
    Acknowledgement, BalanceQueryRequest, BusinessTransferRequest, CommandId, DisbursementRequest,
    OperationRequest, PushPaymentRequest, PushPaymentResponse, PushQueryRequest,
    PushQueryResponse, QrCodeResponse, QrRequest, RegisterUrlsRequest, ReversalRequest, Secret,
    SimulateInboundRequest, StatusQueryRequest, TokenGrant, TokenResponse,
};
use crate::signer::{SignedCredentials, basic_auth};
use crate::timestamp::{Clock, SystemClock};
use crate::token::TokenManager;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("daraja-rs/", env!("CARGO_PKG_VERSION"));

/// Client adapter for the Daraja API.
///
/// Owns its [`ClientConfig`] and access token. Independent instances (for
/// example a sandbox and a production one) never share state.
#[derive(Debug)]
pub struct DarajaClient {
    config: ClientConfig,
    endpoints: EndpointResolver,
    http: Client,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    tokens: TokenManager,
}

impl DarajaClient {
    /// Creates a client for the environment in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] if the HTTP client or the
    /// endpoint resolver cannot be built.
    pub fn try_new(config: ClientConfig) -> Result<Self, DarajaError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DarajaError::configuration(format!("failed to build HTTP client: {e}")))?;
        let endpoints = EndpointResolver::new(config.environment)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        #[cfg(feature = "telemetry")]
        tracing::info!(
            environment = %config.environment,
            business_short_code = %config.business_short_code,
            "daraja.client.initialized"
        );

        Ok(Self {
            tokens: TokenManager::new(Arc::clone(&clock)),
            config,
            endpoints,
            http,
            timeout: DEFAULT_TIMEOUT,
            clock,
        })
    }

    /// Sets the timeout applied to every request, including token exchanges.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends requests to `base_url` instead of the environment host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.endpoints = EndpointResolver::with_base_url(base_url);
        self
    }

    /// Replaces the clock used for signatures and token expiry.
    ///
    /// Discards any cached token.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tokens = TokenManager::new(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Replaces the underlying HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the configured environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.config.environment
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        self.endpoints.base_url()
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a fresh OAuth exchange and caches the new token.
    ///
    /// Joins an exchange already in flight instead of starting another.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Network`] or [`DarajaError::Api`] if the exchange fails.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.generate_token", skip_all, err)
    )]
    pub async fn generate_token(&self) -> Result<TokenGrant, DarajaError> {
        let exchange = self.token_exchange()?;
        let token = self.tokens.refresh(move || exchange).await?;
        Ok(TokenGrant {
            expires_in: token.expires_in(),
            expires_at: token.expires_at(),
        })
    }

    /// Prompts the customer's phone to authorize a payment.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for a bad phone number, an amount
    /// outside 1..=70000 or an over-long reference or description, otherwise
    /// any error of [`DarajaClient::generate_token`] or the submission itself.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.stk_push", skip_all, fields(amount = params.amount))
    )]
    pub async fn stk_push(&self, params: StkPushParams) -> Result<PushPaymentResponse, DarajaError> {
        let phone = normalize(&params.phone_number)?;
        params.validate()?;
        let signed = self.sign();
        let request = PushPaymentRequest {
            business_short_code: self.config.business_short_code.clone(),
            password: Secret::new(signed.password),
            timestamp: signed.timestamp,
            transaction_type: CommandId::CustomerPayBillOnline,
            amount: params.amount,
            party_a: phone.clone(),
            party_b: self.config.business_short_code.clone(),
            phone_number: phone,
            callback_url: params.callback_url,
            account_reference: params.account_reference,
            transaction_desc: params.transaction_desc,
        };
        self.submit(&request).await
    }

    /// Queries the status of a push payment.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for an empty checkout request id,
    /// otherwise a network or API error.
    #[cfg_attr(feature = "telemetry", instrument(name = "daraja.stk_query", skip_all))]
    pub async fn stk_query(&self, params: StkQueryParams) -> Result<PushQueryResponse, DarajaError> {
        params.validate()?;
        let signed = self.sign();
        let request = PushQueryRequest {
            business_short_code: self.config.business_short_code.clone(),
            password: Secret::new(signed.password),
            timestamp: signed.timestamp,
            checkout_request_id: params.checkout_request_id,
        };
        self.submit(&request).await
    }

    /// Registers the confirmation and validation URLs for inbound payments.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for an invalid URL, otherwise a
    /// network or API error.
    #[cfg_attr(feature = "telemetry", instrument(name = "daraja.c2b_register", skip_all))]
    pub async fn c2b_register(
        &self,
        params: C2bRegisterParams,
    ) -> Result<Acknowledgement, DarajaError> {
        params.validate()?;
        let request = RegisterUrlsRequest {
            short_code: self.config.business_short_code.clone(),
            response_type: params.response_type,
            confirmation_url: params.confirmation_url,
            validation_url: params.validation_url,
        };
        self.submit(&request).await
    }

    /// Simulates an inbound customer payment. Sandbox only.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] in production, whatever the
    /// arguments, and [`DarajaError::Validation`] for a bad phone number or a
    /// zero amount.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.c2b_simulate", skip_all, fields(amount = params.amount))
    )]
    pub async fn c2b_simulate(
        &self,
        params: C2bSimulateParams,
    ) -> Result<Acknowledgement, DarajaError> {
        self.ensure_available(Operation::C2bSimulate)?;
        let msisdn = normalize(&params.msisdn)?;
        params.validate()?;
        let request = SimulateInboundRequest {
            short_code: self.config.business_short_code.clone(),
            command_id: params.command_id.command_id(),
            amount: params.amount,
            msisdn,
            bill_ref_number: params.bill_ref_number,
        };
        self.submit(&request).await
    }

    /// Pays a customer from the business account.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments and
    /// [`DarajaError::Configuration`] when no initiator is configured.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.b2c_payment", skip_all, fields(amount = params.amount))
    )]
    pub async fn b2c_payment(
        &self,
        params: B2cPaymentParams,
    ) -> Result<Acknowledgement, DarajaError> {
        let party_b = normalize(&params.party_b)?;
        params.validate()?;
        let initiator = self.initiator(Operation::B2cPayment)?;
        let request = DisbursementRequest {
            initiator_name: initiator.name.clone(),
            security_credential: Secret::new(initiator.security_credential()),
            command_id: params.command_id.command_id(),
            amount: params.amount,
            party_a: self.config.business_short_code.clone(),
            party_b,
            remarks: params.remarks,
            queue_timeout_url: params.queue_timeout_url,
            result_url: params.result_url,
            occasion: params.occasion,
        };
        self.submit(&request).await
    }

    /// Transfers funds to another business.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments and
    /// [`DarajaError::Configuration`] when no initiator is configured.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.b2b_payment", skip_all, fields(amount = params.amount))
    )]
    pub async fn b2b_payment(
        &self,
        params: B2bPaymentParams,
    ) -> Result<Acknowledgement, DarajaError> {
        params.validate()?;
        let initiator = self.initiator(Operation::B2bPayment)?;
        let request = BusinessTransferRequest {
            initiator_name: initiator.name.clone(),
            security_credential: Secret::new(initiator.security_credential()),
            command_id: params.command_id.command_id(),
            amount: params.amount,
            party_a: self.config.business_short_code.clone(),
            party_b: params.party_b,
            remarks: params.remarks,
            queue_timeout_url: params.queue_timeout_url,
            result_url: params.result_url,
            account_reference: params.account_reference,
        };
        self.submit(&request).await
    }

    /// Requests the business account balance. The balance is delivered to
    /// the result URL.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments and
    /// [`DarajaError::Configuration`] when no initiator is configured.
    #[cfg_attr(feature = "telemetry", instrument(name = "daraja.account_balance", skip_all))]
    pub async fn account_balance(
        &self,
        params: AccountBalanceParams,
    ) -> Result<Acknowledgement, DarajaError> {
        params.validate()?;
        let initiator = self.initiator(Operation::AccountBalance)?;
        let request = BalanceQueryRequest {
            initiator_name: initiator.name.clone(),
            security_credential: Secret::new(initiator.security_credential()),
            command_id: CommandId::AccountBalance,
            party_a: self.config.business_short_code.clone(),
            identifier_type: params.identifier_type,
            remarks: params.remarks,
            queue_timeout_url: params.queue_timeout_url,
            result_url: params.result_url,
        };
        self.submit(&request).await
    }

    /// Requests the status of a transaction. The status is delivered to the
    /// result URL.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments and
    /// [`DarajaError::Configuration`] when no initiator is configured.
    #[cfg_attr(feature = "telemetry", instrument(name = "daraja.transaction_status", skip_all))]
    pub async fn transaction_status(
        &self,
        params: TransactionStatusParams,
    ) -> Result<Acknowledgement, DarajaError> {
        params.validate()?;
        let initiator = self.initiator(Operation::TransactionStatus)?;
        let request = StatusQueryRequest {
            initiator_name: initiator.name.clone(),
            security_credential: Secret::new(initiator.security_credential()),
            command_id: CommandId::TransactionStatusQuery,
            transaction_id: params.transaction_id,
            party_a: self.config.business_short_code.clone(),
            identifier_type: params.identifier_type,
            result_url: params.result_url,
            queue_timeout_url: params.queue_timeout_url,
            remarks: params.remarks,
            occasion: params.occasion,
        };
        self.submit(&request).await
    }

    /// Reverses a completed transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments and
    /// [`DarajaError::Configuration`] when no initiator is configured.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "daraja.reversal", skip_all, fields(amount = params.amount))
    )]
    pub async fn reverse_transaction(
        &self,
        params: ReversalParams,
    ) -> Result<Acknowledgement, DarajaError> {
        params.validate()?;
        let initiator = self.initiator(Operation::Reversal)?;
        let request = ReversalRequest {
            initiator_name: initiator.name.clone(),
            security_credential: Secret::new(initiator.security_credential()),
            command_id: CommandId::TransactionReversal,
            transaction_id: params.transaction_id,
            amount: params.amount,
            receiver_party: params.receiver_party,
            receiver_identifier_type: params.receiver_identifier_type,
            result_url: params.result_url,
            queue_timeout_url: params.queue_timeout_url,
            remarks: params.remarks,
            occasion: params.occasion,
        };
        self.submit(&request).await
    }

    /// Generates a dynamic payment QR code.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Validation`] for bad arguments, otherwise a
    /// network or API error.
    #[cfg_attr(feature = "telemetry", instrument(name = "daraja.generate_qr", skip_all))]
    pub async fn generate_qr(
        &self,
        params: GenerateQrParams,
    ) -> Result<QrCodeResponse, DarajaError> {
        params.validate()?;
        let request = QrRequest {
            merchant_name: params.merchant_name,
            ref_no: params.ref_no,
            amount: params.amount,
            trx_code: params.trx_code,
            cpi: params.cpi,
            size: params.size,
        };
        self.submit(&request).await
    }

    fn sign(&self) -> SignedCredentials {
        SignedCredentials::sign(
            &self.config.business_short_code,
            &self.config.pass_key,
            self.clock.as_ref(),
        )
    }

    fn initiator(&self, operation: Operation) -> Result<&InitiatorCredentials, DarajaError> {
        debug_assert!(operation.is_privileged());
        self.config
            .initiator
            .as_ref()
            .filter(|initiator| {
                !initiator.name.trim().is_empty() && !initiator.password.trim().is_empty()
            })
            .ok_or_else(|| {
                DarajaError::configuration(format!(
                    "{operation} requires initiator credentials (initiator name and password)"
                ))
            })
    }

    fn ensure_available(&self, operation: Operation) -> Result<(), DarajaError> {
        if operation.is_sandbox_only() && self.config.environment != Environment::Sandbox {
            return Err(DarajaError::configuration(format!(
                "{operation} is sandbox-only and not available in {}",
                self.config.environment
            )));
        }
        Ok(())
    }

    /// Builds a not-yet-started OAuth exchange for the token manager.
    fn token_exchange(
        &self,
    ) -> Result<impl Future<Output = Result<TokenResponse, DarajaError>> + Send + use<>, DarajaError>
    {
        let context = Operation::Token.name();
        let url = self.endpoints.resolve(Operation::Token)?;
        let request = self
            .http
            .get(url)
            .header(
                AUTHORIZATION,
                basic_auth(&self.config.consumer_key, &self.config.consumer_secret),
            )
            .timeout(self.timeout);
        Ok(async move {
            let response = request
                .send()
                .await
                .map_err(|e| DarajaError::network(context, e))?;
            read_response(response, context).await
        })
    }

    async fn bearer(&self) -> Result<String, DarajaError> {
        let exchange = self.token_exchange()?;
        let token = self.tokens.ensure_valid(move || exchange).await?;
        Ok(token.bearer())
    }

    /// Authenticated POST of one operation payload.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "daraja.submit",
            skip_all,
            fields(
                operation = R::OPERATION.name(),
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    async fn submit<R>(&self, request: &R) -> Result<R::Response, DarajaError>
    where
        R: OperationRequest,
    {
        let context = R::OPERATION.name();
        let url = self.endpoints.resolve(R::OPERATION)?;
        let bearer = self.bearer().await?;

        #[cfg(feature = "telemetry")]
        tracing::info!(
            operation = context,
            business_short_code = %self.config.business_short_code,
            "daraja.request.submitted"
        );

        let result = async {
            let response = self
                .http
                .post(url)
                .header(AUTHORIZATION, bearer)
                .json(request)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| DarajaError::network(context, e))?;
            read_response(response, context).await
        }
        .await;

        record_result_on_span(&result);

        result
    }
}

/// Reads the body of a received response and classifies it.
async fn read_response<R>(response: reqwest::Response, context: &'static str) -> Result<R, DarajaError>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DarajaError::network(context, e))?;
    classify_response(status, body)
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R, DarajaError>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(
                tracing::Level::ERROR,
                error = %err,
                kind = %err.kind(),
                "daraja.request.failed"
            );
        }
    }
}

/// Records the outcome of a request on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span<R>(_result: &Result<R, DarajaError>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::proto::IdentifierType;
    use crate::signer::password;
    use crate::timestamp::{FixedClock, Timestamp};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PASS_KEY: &str = "bfb279f9aa9bdbcf158e97dd71a467cd2e0c893059b10f78e6b72ada1ed2c919";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 11, 30, 0).unwrap()
    }

    fn config() -> ClientConfig {
        ClientConfig::new("key", "secret", "174379", PASS_KEY, Environment::Sandbox)
            .with_initiator("testapi", "Safaricom999!")
    }

    fn client(server: &MockServer, config: ClientConfig) -> DarajaClient {
        DarajaClient::try_new(config)
            .unwrap()
            .with_base_url(server.uri().parse().unwrap())
            .with_clock(Arc::new(FixedClock::new(t0())))
    }

    async fn mount_token(server: &MockServer, times: u64) {
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .and(query_param("grant_type", "client_credentials"))
            .and(header("Authorization", basic_auth("key", "secret").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "test-token", "expires_in": "3599"})),
            )
            .expect(times)
            .mount(server)
            .await;
    }

    /// Fails the test on drop if any request other than the mounted ones arrives.
    async fn forbid_other_calls(server: &MockServer) {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    fn push_params() -> StkPushParams {
        StkPushParams {
            amount: 100,
            phone_number: "0708374149".into(),
            callback_url: "https://example.com/callback".into(),
            account_reference: "ORDER123".into(),
            transaction_desc: "Test".into(),
        }
    }

    fn b2c_params() -> B2cPaymentParams {
        B2cPaymentParams {
            amount: 500,
            party_b: "+254 708 374 149".into(),
            command_id: crate::proto::DisbursementCommand::Salary,
            remarks: "January salary".into(),
            queue_timeout_url: "https://example.com/timeout".into(),
            result_url: "https://example.com/result".into(),
            occasion: None,
        }
    }

    #[tokio::test]
    async fn test_stk_push_sends_signed_normalized_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        let expected_password = password("174379", PASS_KEY, &Timestamp::from_utc(t0()));
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_partial_json(json!({
                "BusinessShortCode": "174379",
                "Password": expected_password,
                "Timestamp": "20240115143000",
                "TransactionType": "CustomerPayBillOnline",
                "Amount": 100,
                "PartyA": "254708374149",
                "PartyB": "174379",
                "PhoneNumber": "254708374149",
                "AccountReference": "ORDER123",
                "TransactionDesc": "Test",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ResponseCode": "0", "CheckoutRequestID": "abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, config())
            .stk_push(push_params())
            .await
            .unwrap();
        assert_eq!(response.checkout_request_id, "abc");
        assert_eq!(response.response_code, "0");
    }

    #[tokio::test]
    async fn test_push_amount_over_limit_never_sent() {
        let server = MockServer::start().await;
        forbid_other_calls(&server).await;

        let err = client(&server, config())
            .stk_push(StkPushParams {
                amount: 80_000,
                ..push_params()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.was_sent());
    }

    #[tokio::test]
    async fn test_invalid_phone_never_sent() {
        let server = MockServer::start().await;
        forbid_other_calls(&server).await;

        let err = client(&server, config())
            .stk_push(StkPushParams {
                phone_number: "0808374149".into(),
                ..push_params()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_server_error_is_classified() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string(r#"{"errorCode":"500001","errorMessage":"Internal"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, config())
            .stk_push(push_params())
            .await
            .unwrap_err();
        assert_eq!(err.api_code(), Some("500001"));
        assert_eq!(err.http_status(), Some(http::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_success_status_with_error_code_is_api_error() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/c2b/v1/registerurl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "11728-2929992-1",
                "errorCode": "401.003.01",
                "errorMessage": "Error Occurred - Invalid Access Token",
            })))
            .mount(&server)
            .await;

        let err = client(&server, config())
            .c2b_register(C2bRegisterParams {
                confirmation_url: "https://example.com/confirm".into(),
                validation_url: "https://example.com/validate".into(),
                response_type: crate::proto::ResponseType::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.api_code(), Some("401.003.01"));
    }

    #[tokio::test]
    async fn test_privileged_operations_require_initiator() {
        let server = MockServer::start().await;
        forbid_other_calls(&server).await;
        let client = client(
            &server,
            ClientConfig::new("key", "secret", "174379", PASS_KEY, Environment::Sandbox),
        );
        let urls = ("https://example.com/timeout", "https://example.com/result");

        let results = [
            client.b2c_payment(b2c_params()).await.map(drop),
            client
                .b2b_payment(B2bPaymentParams {
                    amount: 10,
                    party_b: "600000".into(),
                    command_id: crate::proto::TransferCommand::default(),
                    remarks: "stock".into(),
                    queue_timeout_url: urls.0.into(),
                    result_url: urls.1.into(),
                    account_reference: "ACC1".into(),
                })
                .await
                .map(drop),
            client
                .account_balance(AccountBalanceParams {
                    identifier_type: IdentifierType::ShortCode,
                    remarks: "balance".into(),
                    queue_timeout_url: urls.0.into(),
                    result_url: urls.1.into(),
                })
                .await
                .map(drop),
            client
                .transaction_status(TransactionStatusParams {
                    transaction_id: "OEI2AK4Q16".into(),
                    identifier_type: IdentifierType::ShortCode,
                    result_url: urls.1.into(),
                    queue_timeout_url: urls.0.into(),
                    remarks: "status".into(),
                    occasion: None,
                })
                .await
                .map(drop),
            client
                .reverse_transaction(ReversalParams {
                    transaction_id: "OEI2AK4Q16".into(),
                    amount: 10,
                    receiver_party: "600992".into(),
                    receiver_identifier_type: IdentifierType::Organization,
                    result_url: urls.1.into(),
                    queue_timeout_url: urls.0.into(),
                    remarks: "refund".into(),
                    occasion: None,
                })
                .await
                .map(drop),
        ];

        for result in results {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{err}");
        }
    }

    #[tokio::test]
    async fn test_simulate_rejected_in_production() {
        let server = MockServer::start().await;
        forbid_other_calls(&server).await;
        let config = ClientConfig::new("key", "secret", "174379", PASS_KEY, Environment::Production);

        let err = client(&server, config)
            .c2b_simulate(C2bSimulateParams {
                amount: 10,
                msisdn: "0708374149".into(),
                command_id: crate::proto::SimulateCommand::PayBill,
                bill_ref_number: Some("INV1".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("sandbox"));
    }

    #[tokio::test]
    async fn test_simulate_in_sandbox() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/c2b/v1/simulate"))
            .and(body_partial_json(json!({
                "ShortCode": "174379",
                "CommandID": "CustomerBuyGoodsOnline",
                "Msisdn": "254708374149",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "OriginatorCoversationID": "53e3-4aa8-9fe0-8fb5e4092cdd3405976",
                "ResponseCode": "0",
                "ResponseDescription": "Accept the service request successfully.",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server, config())
            .c2b_simulate(C2bSimulateParams {
                amount: 10,
                msisdn: "0708374149".into(),
                command_id: crate::proto::SimulateCommand::BuyGoods,
                bill_ref_number: None,
            })
            .await
            .unwrap();
        assert_eq!(ack.response_code.as_deref(), Some("0"));
        assert!(ack.originator_conversation_id.is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ResponseCode": "0", "CheckoutRequestID": "abc"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client(&server, config())
            .with_timeout(Duration::from_millis(200))
            .stk_push(push_params())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.was_sent());
    }

    #[tokio::test]
    async fn test_token_is_reused_across_operations() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpushquery/v1/query"))
            .and(body_partial_json(json!({"CheckoutRequestID": "ws_CO_1", "Timestamp": "20240115143000"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ResponseCode": "0",
                "CheckoutRequestID": "ws_CO_1",
                "ResultCode": "0",
                "ResultDesc": "The service request is processed successfully.",
            })))
            .expect(3)
            .mount(&server)
            .await;

        let client = client(&server, config());
        let query = || StkQueryParams {
            checkout_request_id: "ws_CO_1".into(),
        };
        let first = client.stk_query(query()).await.unwrap();
        assert_eq!(first.result_code, Some(0));
        let concurrent =
            futures_util::future::join_all([client.stk_query(query()), client.stk_query(query())])
                .await;
        assert!(concurrent.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "test-token", "expires_in": 3599}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mpesa/qrcode/v1/generate"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ResponseCode": "AG_20191219_000043fdf61864fe9ff5",
                "RequestID": "16738-27456357-1",
                "ResponseDescription": "QR Code Successfully Generated.",
                "QRCode": "iVBORw0KGgoAAAANSUhEUgAAASwAAAEsAQAAAABRBrPYAAABrE",
            })))
            .expect(4)
            .mount(&server)
            .await;

        let client = Arc::new(client(&server, config()));
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    client
                        .generate_qr(GenerateQrParams {
                            merchant_name: "TEST SUPERMARKET".into(),
                            ref_no: "Invoice Test".into(),
                            amount: 1,
                            trx_code: crate::proto::TrxCode::BuyGoods,
                            cpi: "373132".into(),
                            size: "300".into(),
                        })
                        .await
                })
            })
            .collect();
        for task in futures_util::future::join_all(tasks).await {
            assert!(task.unwrap().unwrap().qr_code.is_some());
        }
    }

    #[tokio::test]
    async fn test_generate_token_always_exchanges() {
        let server = MockServer::start().await;
        mount_token(&server, 2).await;

        let client = client(&server, config());
        let first = client.generate_token().await.unwrap();
        let second = client.generate_token().await.unwrap();
        assert_eq!(first.expires_in, 3599);
        assert_eq!(first.expires_at, t0() + chrono::TimeDelta::seconds(3599));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_token_failure_aborts_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errorCode": "400.008.01",
                "errorMessage": "Invalid Authentication passed",
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server, config());
        let query = StkQueryParams {
            checkout_request_id: "ws_CO_1".into(),
        };
        let err = client.stk_query(query.clone()).await.unwrap_err();
        assert_eq!(err.api_code(), Some("400.008.01"));
        assert_eq!(err.http_status(), Some(http::StatusCode::BAD_REQUEST));
        // The failed exchange left no token behind, so the next call retries.
        assert!(client.stk_query(query).await.is_err());
    }

    #[tokio::test]
    async fn test_b2c_uses_initiator_and_normalized_party() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/b2c/v1/paymentrequest"))
            .and(body_partial_json(json!({
                "InitiatorName": "testapi",
                "SecurityCredential": "ENCRYPTED==",
                "CommandID": "SalaryPayment",
                "Amount": 500,
                "PartyA": "174379",
                "PartyB": "254708374149",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ConversationID": "AG_20240115_00004e4a1c8bb4fca7d1",
                "OriginatorConversationID": "10571-7910404-1",
                "ResponseCode": "0",
                "ResponseDescription": "Accept the service request successfully.",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server, config().with_security_credential("ENCRYPTED=="))
            .b2c_payment(b2c_params())
            .await
            .unwrap();
        assert_eq!(ack.conversation_id.as_deref(), Some("AG_20240115_00004e4a1c8bb4fca7d1"));
    }

    #[tokio::test]
    async fn test_reversal_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/reversal/v1/request"))
            .and(body_partial_json(json!({
                "CommandID": "TransactionReversal",
                "SecurityCredential": "Safaricom999!",
                "TransactionID": "OEI2AK4Q16",
                "ReceiverParty": "600992",
                "RecieverIdentifierType": "11",
                "Occasion": "duplicate",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ResponseCode": "0"})))
            .expect(1)
            .mount(&server)
            .await;

        let params: ReversalParams = serde_json::from_value(json!({
            "transaction_id": "OEI2AK4Q16",
            "amount": 10,
            "receiver_party": "600992",
            "result_url": "https://example.com/result",
            "queue_timeout_url": "https://example.com/timeout",
            "remarks": "refund",
            "occasion": "duplicate",
        }))
        .unwrap();
        client(&server, config())
            .reverse_transaction(params)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blank_initiator_is_missing() {
        let server = MockServer::start().await;
        forbid_other_calls(&server).await;
        let urls = ("https://example.com/timeout", "https://example.com/result");
        let balance = || AccountBalanceParams {
            identifier_type: IdentifierType::ShortCode,
            remarks: "balance".into(),
            queue_timeout_url: urls.0.into(),
            result_url: urls.1.into(),
        };

        for (name, password) in [("", ""), ("testapi", "  "), (" ", "Safaricom999!")] {
            let config = ClientConfig::new("key", "secret", "174379", PASS_KEY, Environment::Sandbox)
                .with_initiator(name, password);
            let err = client(&server, config)
                .account_balance(balance())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{name:?}/{password:?}");
            assert!(!err.was_sent());
        }
    }

    #[tokio::test]
    async fn test_c2b_register_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/c2b/v1/registerurl"))
            .and(body_partial_json(json!({
                "ShortCode": "174379",
                "ResponseType": "Cancelled",
                "ConfirmationURL": "https://example.com/confirm",
                "ValidationURL": "https://example.com/validate",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "OriginatorCoversationID": "7619-37765134-1",
                "ResponseCode": "0",
                "ResponseDescription": "success",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server, config())
            .c2b_register(C2bRegisterParams {
                confirmation_url: "https://example.com/confirm".into(),
                validation_url: "https://example.com/validate".into(),
                response_type: crate::proto::ResponseType::Cancelled,
            })
            .await
            .unwrap();
        assert_eq!(ack.response_description.as_deref(), Some("success"));
    }

    #[tokio::test]
    async fn test_b2b_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/b2b/v1/paymentrequest"))
            .and(body_partial_json(json!({
                "InitiatorName": "testapi",
                "SecurityCredential": "Safaricom999!",
                "CommandID": "BusinessToBusinessTransfer",
                "Amount": 250,
                "PartyA": "174379",
                "PartyB": "600000",
                "Remarks": "stock",
                "AccountReference": "ACC1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ConversationID": "AG_20240115_0000",
                "ResponseCode": "0",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params: B2bPaymentParams = serde_json::from_value(json!({
            "amount": 250,
            "party_b": "600000",
            "command_id": "B2BTransfer",
            "remarks": "stock",
            "queue_timeout_url": "https://example.com/timeout",
            "result_url": "https://example.com/result",
            "account_reference": "ACC1",
        }))
        .unwrap();
        let ack = client(&server, config()).b2b_payment(params).await.unwrap();
        assert_eq!(ack.response_code.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_account_balance_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/accountbalance/v1/query"))
            .and(body_partial_json(json!({
                "InitiatorName": "testapi",
                "CommandID": "AccountBalance",
                "PartyA": "174379",
                "IdentifierType": "4",
                "Remarks": "balance",
                "QueueTimeOutURL": "https://example.com/timeout",
                "ResultURL": "https://example.com/result",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ResponseCode": "0"})))
            .expect(1)
            .mount(&server)
            .await;

        let params: AccountBalanceParams = serde_json::from_value(json!({
            "remarks": "balance",
            "queue_timeout_url": "https://example.com/timeout",
            "result_url": "https://example.com/result",
        }))
        .unwrap();
        client(&server, config())
            .account_balance(params)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transaction_status_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/transactionstatus/v1/query"))
            .and(body_partial_json(json!({
                "InitiatorName": "testapi",
                "CommandID": "TransactionStatusQuery",
                "TransactionID": "OEI2AK4Q16",
                "PartyA": "174379",
                "IdentifierType": "2",
                "Occasion": "audit",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ConversationID": "AG_20240115_0001",
                "OriginatorConversationID": "16917-22577599-3",
                "ResponseCode": "0",
                "ResponseDescription": "Accept the service request successfully.",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = client(&server, config())
            .transaction_status(TransactionStatusParams {
                transaction_id: "OEI2AK4Q16".into(),
                identifier_type: IdentifierType::Till,
                result_url: "https://example.com/result".into(),
                queue_timeout_url: "https://example.com/timeout".into(),
                remarks: "status".into(),
                occasion: Some("audit".into()),
            })
            .await
            .unwrap();
        assert_eq!(ack.originator_conversation_id.as_deref(), Some("16917-22577599-3"));
    }

    #[tokio::test]
    async fn test_generate_qr_payload() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/qrcode/v1/generate"))
            .and(body_partial_json(json!({
                "MerchantName": "TEST SUPERMARKET",
                "RefNo": "Invoice Test",
                "Amount": 1,
                "TrxCode": "SM",
                "CPI": "254708374149",
                "Size": "300",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ResponseCode": "00",
                "QRCode": "iVBORw0KGgo",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let params: GenerateQrParams = serde_json::from_value(json!({
            "merchant_name": "TEST SUPERMARKET",
            "ref_no": "Invoice Test",
            "amount": 1,
            "trx_code": "SM",
            "cpi": "254708374149",
        }))
        .unwrap();
        let qr = client(&server, config()).generate_qr(params).await.unwrap();
        assert_eq!(qr.qr_code.as_deref(), Some("iVBORw0KGgo"));
    }

    #[tokio::test]
    async fn test_undecodable_success_is_invalid_response() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/processrequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let err = client(&server, config())
            .stk_push(push_params())
            .await
            .unwrap_err();
        assert_eq!(err.api_code(), Some(crate::error::INVALID_RESPONSE_CODE));
    }

    #[test]
    fn test_defaults() {
        let client = DarajaClient::try_new(config()).unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.base_url().as_str(), "https://sandbox.safaricom.co.ke/");
        assert_eq!(client.environment(), Environment::Sandbox);
    }
}
