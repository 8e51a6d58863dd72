//! Deskew and segment handwritten exam pages, assemble the line
//! images into CTC training batches, and score transcriptions.
//!
//! The binary drives the three stages from the command line. A
//! model runtime links the library instead: it runs
//! [`application::assemble_use_case::AssembleUseCase::execute_with`]
//! (or a [`data::assembler::DatasetAssembler`] directly), moves each
//! batch onto its device with [`ml::batcher::CtcBatch::from_batch`],
//! derives CTC lengths with [`ml::ctc::derive_lengths`] and decodes
//! its output with [`ml::ctc::greedy_decode`].

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod vision;
pub mod ml;
pub mod infra;
pub mod eval;
