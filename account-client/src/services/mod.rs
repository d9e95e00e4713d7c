pub mod account_client;
