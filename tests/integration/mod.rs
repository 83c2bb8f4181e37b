//! Integration Tests Module
//!
//! End-to-end tests of the incident responder: the agent loop against a
//! scripted model provider, the log store scenarios, and the retriever
//! against in-memory backends.

// Shared scripted provider, backends and event sink
mod support;

// Agent loop tests
mod agent_test;

// Log store scenario tests
mod logstore_test;

// Context retriever and runbook library tests
mod retriever_test;
