pub(crate) mod client;
mod key_pair;
mod login;

pub(crate) use login::{get_base_url, login};
