//! Tests for the verification services

mod mocks;
