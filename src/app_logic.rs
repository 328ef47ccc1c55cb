/*
 * This module provides the application logic layer, centered around
 * `AssetManagerLogic`, which turns operator events into engine calls and
 * notices. The operator surface is abstracted by `OperatorPromptOperations`;
 * `console` implements it over line-based input and output.
 * Unit tests for `AssetManagerLogic` are in `handler_tests.rs`.
 */
pub mod console;
pub mod handler;
pub mod prompts;


pub use console::ConsolePrompts;
pub use handler::{APP_NAME, AssetManagerEvent, AssetManagerLogic};
pub use prompts::{MessageSeverity, OperatorPromptOperations};
