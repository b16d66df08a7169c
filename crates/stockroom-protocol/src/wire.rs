//! Wire messages for the network front.
//!
//! Every frame carries exactly one [`Envelope`]. The client picks the
//! envelope `id`; the server echoes it on the matching response so the
//! client can pair them even if it pipelines requests.
//!
//! ```text
//! → { "id": 7, "body": { "type": "Login", "username": "...", "password": "..." } }
//! ← { "id": 7, "body": { "type": "LoggedIn", "user": {...}, "token": "..." } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    InventorySummary, Product, ProductDraft, ProductId, ProductPatch, User,
};

/// HTTP-style status codes carried by [`Response::Error`].
pub mod error_codes {
    /// Malformed input, validation failure, duplicate sku or username.
    pub const BAD_REQUEST: u16 = 400;
    /// Missing, unknown, or expired session; failed login.
    pub const UNAUTHORIZED: u16 = 401;
    /// The product does not exist for this caller.
    pub const NOT_FOUND: u16 = 404;
    /// Something failed inside the server.
    pub const INTERNAL: u16 = 500;
}

/// Correlates a request with its response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub id: u64,
    pub body: T,
}

/// Client → server.
///
/// Everything except `Register` and `Login` carries the session token
/// issued by one of those two.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout { token: String },
    Me { token: String },
    ListProducts { token: String },
    GetProduct { token: String, id: ProductId },
    CreateProduct { token: String, product: ProductDraft },
    UpdateProduct {
        token: String,
        id: ProductId,
        changes: ProductPatch,
    },
    DeleteProduct { token: String, id: ProductId },
    Summary { token: String },
}

impl Request {
    /// The variant name, safe to put in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "Register",
            Self::Login { .. } => "Login",
            Self::Logout { .. } => "Logout",
            Self::Me { .. } => "Me",
            Self::ListProducts { .. } => "ListProducts",
            Self::GetProduct { .. } => "GetProduct",
            Self::CreateProduct { .. } => "CreateProduct",
            Self::UpdateProduct { .. } => "UpdateProduct",
            Self::DeleteProduct { .. } => "DeleteProduct",
            Self::Summary { .. } => "Summary",
        }
    }
}

// Passwords and tokens must never reach a log line through `{:?}`.
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register { username, .. } | Self::Login { username, .. } => f
                .debug_struct(self.kind())
                .field("username", username)
                .finish_non_exhaustive(),
            Self::GetProduct { id, .. } | Self::DeleteProduct { id, .. } => f
                .debug_struct(self.kind())
                .field("id", id)
                .finish_non_exhaustive(),
            Self::UpdateProduct { id, changes, .. } => f
                .debug_struct(self.kind())
                .field("id", id)
                .field("changes", changes)
                .finish_non_exhaustive(),
            Self::CreateProduct { product, .. } => f
                .debug_struct(self.kind())
                .field("product", product)
                .finish_non_exhaustive(),
            _ => f.debug_struct(self.kind()).finish_non_exhaustive(),
        }
    }
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Registered { user: User, token: String },
    LoggedIn { user: User, token: String },
    LoggedOut,
    Me { user: User },
    Products { products: Vec<Product> },
    Product { product: Product },
    Deleted { id: ProductId },
    Summary { summary: InventorySummary },
    /// `code` follows [`error_codes`]; `message` is safe to show a user.
    Error { code: u16, message: String },
}

impl Response {
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    #[test]
    fn test_request_internally_tagged_json_format() {
        let req = Request::GetProduct {
            token: "abc".into(),
            id: ProductId(4),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "GetProduct");
        assert_eq!(json["token"], "abc");
        assert_eq!(json["id"], 4);
    }

    #[test]
    fn test_request_update_decodes_partial_changes() {
        let json = r#"{"type":"UpdateProduct","token":"t","id":1,
                       "changes":{"stock":3}}"#;
        let req: Request = serde_json::from_str(json).unwrap();

        match req {
            Request::UpdateProduct { id, changes, .. } => {
                assert_eq!(id, ProductId(1));
                assert_eq!(changes.stock, Some(3));
                assert!(changes.sku.is_none());
            }
            other => panic!("expected UpdateProduct, got {other:?}"),
        }
    }

    #[test]
    fn test_request_unknown_type_fails_to_decode() {
        let result: Result<Request, _> =
            serde_json::from_str(r#"{"type":"DropTables"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_debug_redacts_password_and_token() {
        let login = Request::Login {
            username: "a@x.com".into(),
            password: "hunter2".into(),
        };
        let list = Request::ListProducts {
            token: "secret-token".into(),
        };

        let login_dbg = format!("{login:?}");
        assert!(login_dbg.contains("a@x.com"));
        assert!(!login_dbg.contains("hunter2"));
        assert!(!format!("{list:?}").contains("secret-token"));
    }

    #[test]
    fn test_response_error_json_format() {
        let json =
            serde_json::to_value(Response::error(401, "unauthorized")).unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["code"], 401);
        assert_eq!(json["message"], "unauthorized");
    }

    #[test]
    fn test_envelope_echoes_id_around_body() {
        let env = Envelope {
            id: 9,
            body: Response::Me {
                user: User {
                    id: UserId(1),
                    username: "a@x.com".into(),
                },
            },
        };
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["body"]["type"], "Me");
        assert_eq!(json["body"]["user"]["username"], "a@x.com");
    }
}
