use crate::database::Store;
use crate::models::{role::Role, user::User};
use actix_service::{self, Transform};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    web, Error, HttpMessage, HttpRequest, HttpResponse,
};
use chrono::Utc;
use futures::{
    future::{ready, LocalBoxFuture, Ready},
    FutureExt,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    iss: String,
    iat: i64,
    sub: String,
    role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SessionCredential {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug)]
pub struct SessionAuthenticationData {
    pub email: String,
    pub role: Role,
    pub token: String,
}

pub struct SessionAuthenticationMiddleware<S> {
    service: Rc<S>,
}
pub struct SessionAuthenticationMiddlewareFactory;

pub type SessionAuthentication = Rc<SessionAuthenticationData>;

impl SessionCredential {
    /// Demo-console authentication: the password is never verified. The
    /// role comes from the payload when present, otherwise from the demo
    /// credential table. A real deployment would put a credential
    /// verifier behind this method.
    pub async fn authenticate(&self, store: &Store) -> Result<(String, Identity), String> {
        let role = match self.role.or_else(|| store.demo_role(&self.email)) {
            Some(role) => role,
            None => return Err("UNKNOWN_ROLE".to_string()),
        };

        let claims = SessionClaims {
            iss: "Faena".to_string(),
            iat: Utc::now().timestamp(),
            sub: self.email.clone(),
            role,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(store.secret()),
        )
        .map_err(|_| "GENERATING_FAILED".to_string())?;

        let identity = Identity {
            email: self.email.clone(),
            role,
        };

        store
            .sessions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .insert(token.clone(), identity.clone());

        if let Ok(Some(_)) = User::find_by_email(store, &self.email).await {
            User::stamp_last_login(store, &self.email).await?;
        }

        Ok((token, identity))
    }

    /// A token is live only while its session-table row exists, so logout
    /// revokes immediately even though tokens carry no expiry.
    pub fn verify(token: &str, store: &Store) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(store.secret()),
            &validation,
        )
        .ok()?;

        store.sessions.read().ok()?.get(token).cloned()
    }

    pub fn revoke(token: &str, store: &Store) -> Result<Identity, String> {
        store
            .sessions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .remove(token)
            .ok_or_else(|| "SESSION_NOT_FOUND".to_string())
    }
}

/// Route-guard decision, taken in every protected handler: no session
/// means 401 (the login redirect analog), a session whose role is not in
/// the allow-list means 403 (the default-landing redirect analog).
pub fn authorize(
    req: &HttpRequest,
    allowed: &[Role],
) -> Result<SessionAuthentication, HttpResponse> {
    match req.extensions().get::<SessionAuthentication>() {
        Some(session) => {
            if session.role.validate(allowed) {
                Ok(session.clone())
            } else {
                Err(HttpResponse::Forbidden().body("FORBIDDEN"))
            }
        }
        None => Err(HttpResponse::Unauthorized().body("UNAUTHORIZED")),
    }
}

impl<S, B> Service<ServiceRequest> for SessionAuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv: Rc<S> = self.service.clone();
        let store = req.app_data::<web::Data<Store>>().cloned();

        async move {
            if let Some(store) = store {
                if let Some(bearer_token) = req.headers().get("Authorization") {
                    if let Ok(header) = bearer_token.to_str() {
                        if let Some(token) = header.strip_prefix("Bearer ") {
                            if let Some(identity) = SessionCredential::verify(token, &store) {
                                let auth_data = SessionAuthenticationData {
                                    email: identity.email,
                                    role: identity.role,
                                    token: token.to_string(),
                                };
                                req.extensions_mut()
                                    .insert::<SessionAuthentication>(Rc::new(auth_data));
                            }
                        }
                    }
                }
            }
            let res: ServiceResponse<B> = srv.call(req).await?;
            Ok(res)
        }
        .boxed_local()
    }
}
impl<S, B> Transform<S, ServiceRequest> for SessionAuthenticationMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionAuthenticationMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthenticationMiddleware {
            service: Rc::new(service),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    #[actix_web::test]
    async fn login_attaches_caller_supplied_role() {
        let store = Store::seed("test-secret".to_string());
        let credential = SessionCredential {
            email: "nueva@minera.com".to_string(),
            password: "whatever".to_string(),
            role: Some(Role::Supervisor),
        };

        let (token, identity) = credential.authenticate(&store).await.unwrap();
        assert_eq!(identity.role, Role::Supervisor);

        let verified = SessionCredential::verify(&token, &store).unwrap();
        assert_eq!(verified.email, "nueva@minera.com");
    }

    #[actix_web::test]
    async fn login_falls_back_to_demo_credential_table() {
        let store = Store::seed("test-secret".to_string());
        let credential = SessionCredential {
            email: "admin@minera.com".to_string(),
            password: "anything-at-all".to_string(),
            role: None,
        };

        let (_, identity) = credential.authenticate(&store).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[actix_web::test]
    async fn login_without_resolvable_role_is_rejected() {
        let store = Store::seed("test-secret".to_string());
        let credential = SessionCredential {
            email: "desconocido@minera.com".to_string(),
            password: "x".to_string(),
            role: None,
        };

        assert_eq!(
            credential.authenticate(&store).await.unwrap_err(),
            "UNKNOWN_ROLE"
        );
    }

    #[actix_web::test]
    async fn revoked_token_no_longer_verifies() {
        let store = Store::seed("test-secret".to_string());
        let credential = SessionCredential {
            email: "admin@minera.com".to_string(),
            password: "x".to_string(),
            role: None,
        };

        let (token, _) = credential.authenticate(&store).await.unwrap();
        SessionCredential::revoke(&token, &store).unwrap();
        assert!(SessionCredential::verify(&token, &store).is_none());
    }
}
