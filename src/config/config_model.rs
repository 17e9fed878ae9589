#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub video: Video,
    pub payment: Payment,
    pub mail: Mail,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Video {
    pub api_base: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub key_id: String,
}

#[derive(Debug, Clone)]
pub struct Mail {
    pub api_base: String,
    pub api_key: String,
    pub from: String,
    pub operator_email: String,
}
