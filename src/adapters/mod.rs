// Adapters: implementations of the domain ports against real backends.

pub mod rest_store;

pub use rest_store::RestResultStore;
