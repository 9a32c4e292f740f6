use std::time::Duration;

use reqwest::{Client, Error, redirect};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
    pub fn default_user_agent() -> String {
        DEFAULT_USER_AGENT.to_string()
    }

    pub fn new() -> Result<Client, Error> {
        Client::builder()
            .user_agent(Self::default_user_agent())
            .timeout(Duration::from_secs(10))
            .build()
    }

    /// Client that surfaces 3xx responses instead of following them. Used for
    /// the final-URL hop, where the redirect target is the answer.
    pub fn new_no_redirect() -> Result<Client, Error> {
        Client::builder()
            .user_agent(Self::default_user_agent())
            .timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::none())
            .build()
    }
}
