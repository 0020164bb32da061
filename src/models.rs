use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    #[schema(example = "correct horse battery", format = "password")]
    pub password: String,
    /// "N/A" when left out
    #[schema(example = "Engineer")]
    pub position: Option<String>,
    /// "N/A" when left out
    #[schema(example = "Platform")]
    pub department: Option<String>,
    /// "N/A" when left out
    #[schema(example = "+1 555 0100")]
    pub phone: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    #[schema(example = "correct horse battery", format = "password")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// seconds until the access token expires
    #[schema(example = 900)]
    pub expires_in: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    /// employee email
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,
}
