//! Encryption service: wraps payloads into envelopes and back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::encoding::TextEncoding;
use crate::validation::{EnvelopeValidator, StructuralValidator};
use sealfield_common::{Error, Result};
use sealfield_crypto::{CryptoContext, Envelope};

/// Encrypts payloads through one crypto context and validates inbound
/// envelopes before decrypting them.
///
/// The service shares its context and validator; cloning the service is
/// cheap and yields another handle on the same context.
#[derive(Clone)]
pub struct EncryptionService {
    context: Arc<dyn CryptoContext>,
    validator: Arc<dyn EnvelopeValidator>,
}

impl EncryptionService {
    /// Create a service using the structural validator.
    pub fn new(context: Arc<dyn CryptoContext>) -> Self {
        Self {
            context,
            validator: Arc::new(StructuralValidator),
        }
    }

    /// Start building a service from explicit collaborators.
    pub fn builder() -> EncryptionServiceBuilder {
        EncryptionServiceBuilder::default()
    }

    /// The context this service encrypts with.
    pub fn context(&self) -> &Arc<dyn CryptoContext> {
        &self.context
    }

    /// Encrypt raw bytes.
    ///
    /// The envelope carries the context's salt and IV, so it is always
    /// structurally valid.
    pub fn encrypt(&self, payload: &[u8]) -> Result<Envelope> {
        let ciphertext = self.context.encrypt(payload)?;
        Ok(Envelope::new(
            self.context.salt().to_vec(),
            self.context.iv().to_vec(),
            ciphertext,
        ))
    }

    /// Encode `text` with the named charset, then encrypt.
    ///
    /// # Errors
    /// - `Error::Encoding` when the charset is unsupported
    pub fn encrypt_text(&self, text: &str, encoding: &str) -> Result<Envelope> {
        let encoding = TextEncoding::lookup(encoding)?;
        self.encrypt(&encoding.encode(text))
    }

    /// Serialize `value` as JSON, then encrypt the JSON bytes.
    pub fn encrypt_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Envelope> {
        let json = serde_json::to_vec(value)?;
        self.encrypt(&json)
    }

    /// Validate, then decrypt.
    ///
    /// # Errors
    /// - `Error::Validation` listing every missing field; no decryption is
    ///   attempted in that case
    /// - Any cryptographic error from the context, unchanged
    pub fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let result = self.validator.validate(envelope);
        if !result.is_valid() {
            let fields: Vec<&str> = result.violations().iter().map(|v| v.field.as_str()).collect();
            warn!(?fields, "Rejected invalid encrypted value");
            return Err(Error::Validation(result.violations().to_vec()));
        }

        self.context.decrypt(envelope)
    }

    /// Decrypt and decode with the named charset.
    pub fn decrypt_text(&self, envelope: &Envelope, encoding: &str) -> Result<String> {
        let encoding = TextEncoding::lookup(encoding)?;
        encoding.decode(&self.decrypt(envelope)?)
    }

    /// Decrypt and parse the plaintext as JSON.
    pub fn decrypt_value<T: DeserializeOwned>(&self, envelope: &Envelope) -> Result<T> {
        let plaintext = self.decrypt(envelope)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService").finish_non_exhaustive()
    }
}

/// Builder requiring both collaborators.
#[derive(Default)]
pub struct EncryptionServiceBuilder {
    context: Option<Arc<dyn CryptoContext>>,
    validator: Option<Arc<dyn EnvelopeValidator>>,
}

impl EncryptionServiceBuilder {
    pub fn context(mut self, context: Arc<dyn CryptoContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn EnvelopeValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// # Errors
    /// - `Error::ServiceInit` if the context or validator was not supplied
    pub fn build(self) -> Result<EncryptionService> {
        let context = self
            .context
            .ok_or_else(|| Error::ServiceInit("Crypto context is required".to_string()))?;
        let validator = self
            .validator
            .ok_or_else(|| Error::ServiceInit("Validator is required".to_string()))?;

        Ok(EncryptionService { context, validator })
    }
}
