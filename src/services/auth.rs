// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::common::error::AppError;

// Claims dos tokens emitidos pelo provedor de autenticação externo.
// Aqui só validamos; login e cadastro acontecem no provedor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,               // uid do usuário no provedor
    pub email: Option<String>,
    pub exp: usize,                // Expiration time
    pub iat: usize,                // Issued At
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(), // HS256 + exp obrigatório
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejeitado: {}", e);
                AppError::InvalidToken
            })
    }
}
