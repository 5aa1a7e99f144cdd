//! Route paths.

pub const GET_API: &str = "/api";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_GET_ID: &str = "/api/auth/get-id";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";

pub const POST_ACCOUNTS_SIGNUP: &str = "/api/accounts/signup";
pub const POST_ACCOUNTS_LOGIN: &str = "/api/accounts/login";
pub const GET_ACCOUNTS_PROFILE: &str = "/api/accounts/profile";
pub const PATCH_ACCOUNTS_UPDATE_ROLE: &str = "/api/accounts/update-role";

pub const GET_USERS_PROFILE: &str = "/api/users/profile";
pub const POST_USERS_UPDATE_PROFILE: &str = "/api/users/update-profile";
pub const GET_USERS_ADMIN_USERS: &str = "/api/users/admin/users";
pub const POST_USERS_ADMIN_MANAGE_USER: &str = "/api/users/admin/manage-user";
pub const PATCH_USERS_UPDATE_ROLE: &str = "/api/users/update-role";

pub const POST_DEPARTMENTS_MANAGE: &str = "/api/departments/manage";
pub const GET_DEPARTMENTS: &str = "/api/departments";

pub const POST_TOKENS_GENERATE: &str = "/api/tokens/generate";
pub const GET_TOKENS_BY_NUMBER: &str = "/api/tokens/token/{token_number}";
pub const GET_TOKENS_BY_ID: &str = "/api/tokens/{token_id}";
pub const POST_TOKENS_UPDATE_STATUS: &str = "/api/tokens/update-status";
pub const GET_TOKENS: &str = "/api/tokens";
