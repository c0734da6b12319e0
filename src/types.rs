use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub(crate) struct SnowflakeResponse<T> {
    pub(crate) data: Option<T>,
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) success: bool,
}
