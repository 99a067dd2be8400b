//! Operation catalogue and endpoint resolution.
//!
//! [`Operation`] is the closed set of provider calls. Each one has a fixed
//! path; the host depends only on the [`Environment`].

use std::fmt;

use url::Url;

use crate::config::Environment;
use crate::error::DarajaError;

/// Sandbox API host.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

/// Production API host.
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// A provider operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// OAuth client-credentials exchange.
    Token,
    /// Push payment (STK push / M-Pesa Express).
    StkPush,
    /// Push payment status query.
    StkQuery,
    /// C2B confirmation/validation URL registration.
    C2bRegister,
    /// C2B inbound payment simulation (sandbox only).
    C2bSimulate,
    /// Business-to-customer disbursement.
    B2cPayment,
    /// Business-to-business transfer.
    B2bPayment,
    /// Account balance query.
    AccountBalance,
    /// Transaction status query.
    TransactionStatus,
    /// Transaction reversal.
    Reversal,
    /// Dynamic QR code generation.
    GenerateQr,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Token,
        Self::StkPush,
        Self::StkQuery,
        Self::C2bRegister,
        Self::C2bSimulate,
        Self::B2cPayment,
        Self::B2bPayment,
        Self::AccountBalance,
        Self::TransactionStatus,
        Self::Reversal,
        Self::GenerateQr,
    ];

    /// Path (and query) of the operation relative to the API host.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Token => "/oauth/v1/generate?grant_type=client_credentials",
            Self::StkPush => "/mpesa/stkpush/v1/processrequest",
            Self::StkQuery => "/mpesa/stkpushquery/v1/query",
            Self::C2bRegister => "/mpesa/c2b/v1/registerurl",
            Self::C2bSimulate => "/mpesa/c2b/v1/simulate",
            Self::B2cPayment => "/mpesa/b2c/v1/paymentrequest",
            Self::B2bPayment => "/mpesa/b2b/v1/paymentrequest",
            Self::AccountBalance => "/mpesa/accountbalance/v1/query",
            Self::TransactionStatus => "/mpesa/transactionstatus/v1/query",
            Self::Reversal => "/mpesa/reversal/v1/request",
            Self::GenerateQr => "/mpesa/qrcode/v1/generate",
        }
    }

    /// Short human-readable name, used in logs and error contexts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Token => "token exchange",
            Self::StkPush => "stk push",
            Self::StkQuery => "stk query",
            Self::C2bRegister => "c2b register",
            Self::C2bSimulate => "c2b simulate",
            Self::B2cPayment => "b2c payment",
            Self::B2bPayment => "b2b payment",
            Self::AccountBalance => "account balance",
            Self::TransactionStatus => "transaction status",
            Self::Reversal => "reversal",
            Self::GenerateQr => "generate qr",
        }
    }

    /// Whether the operation needs initiator credentials.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::B2cPayment
                | Self::B2bPayment
                | Self::AccountBalance
                | Self::TransactionStatus
                | Self::Reversal
        )
    }

    /// Whether the operation carries a timestamp-derived password.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::StkPush | Self::StkQuery)
    }

    /// Whether the operation is only available in the sandbox.
    #[must_use]
    pub const fn is_sandbox_only(self) -> bool {
        matches!(self, Self::C2bSimulate)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Environment {
    /// Returns the API host for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Returns the full URL of `operation` in `environment`.
#[must_use]
pub fn url_for(operation: Operation, environment: Environment) -> String {
    format!("{}{}", environment.base_url(), operation.path())
}

/// Resolves operations against a base URL.
///
/// Defaults to the environment host; tests and proxies may substitute another
/// base with [`EndpointResolver::with_base_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    base_url: Url,
}

impl EndpointResolver {
    /// Creates a resolver for the host of `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] if the host cannot be parsed,
    /// which does not happen for the built-in hosts.
    pub fn new(environment: Environment) -> Result<Self, DarajaError> {
        let base_url = Url::parse(environment.base_url()).map_err(|e| {
            DarajaError::configuration(format!("invalid base url for {environment}: {e}"))
        })?;
        Ok(Self { base_url })
    }

    /// Creates a resolver for an arbitrary base URL.
    ///
    /// A path on the base is kept: operation paths are appended below it, so
    /// `http://proxy/daraja` resolves push payments to
    /// `http://proxy/daraja/mpesa/stkpush/v1/processrequest`.
    #[must_use]
    pub fn with_base_url(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the full URL of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`DarajaError::Configuration`] if the URL cannot be joined.
    pub fn resolve(&self, operation: Operation) -> Result<Url, DarajaError> {
        let relative = operation.path().trim_start_matches('/');
        self.base_url.join(relative).map_err(|e| {
            DarajaError::configuration(format!("failed to construct {operation} url: {e}"))
        })
    }
}
