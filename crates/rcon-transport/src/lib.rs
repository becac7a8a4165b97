//! # rcon-transport
//!
//! データグラムに収まらないサーバー応答の再組み立て。
//!
//! サーバーは大きな応答を型 0x01 の断片に分けて送る。各断片は総数と
//! 0 始まりの番号を持ち、順不同・欠落ありで届く。
//!
//! ```text
//! [0x01][0x00][0x00][total][index][payload...]
//! ```

#![no_std]
extern crate alloc;

pub mod fragment;

pub use fragment::FragmentReassembler;
pub use rcon_proto::Fragment;
