pub mod classifier;
pub mod document_service;
pub mod eligibility;
pub mod reminder_scheduler;
pub mod scanner;
pub mod storage;
