use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use log::warn;

use crate::constants::*;
use crate::mmu::{Mmu, Pid};

/// One line of an operation script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Alloc { pid: Pid, bytes: isize },
    Write { pid: Pid, address: isize, data: Vec<u8> },
    Read { pid: Pid, address: isize, bytes: isize },
    Free { pid: Pid, pages: isize },
    Dump,
}

#[derive(Debug, Default)]
pub struct Script {
    pub operations: Vec<Operation>,
}

impl Script {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read script {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut operations = Vec::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let op = parse_line(line).with_context(|| format!("line {}", i + 1))?;
            operations.push(op);
        }
        Ok(Script { operations })
    }

    /// Run every operation in order. MMU errors are reported in the output
    /// and do not stop the run.
    pub fn run(&self, mmu: &mut Mmu) -> Vec<String> {
        self.operations.iter().map(|op| execute(mmu, op)).collect()
    }
}

fn parse_line(line: &str) -> Result<Operation> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (cmd, args) = tokens
        .split_first()
        .ok_or_else(|| anyhow!("empty operation"))?;

    let arity = |n: usize| -> Result<()> {
        if args.len() != n {
            bail!("'{}' takes {} arguments, got {}", cmd, n, args.len());
        }
        Ok(())
    };

    let op = match *cmd {
        "alloc" => {
            arity(2)?;
            Operation::Alloc { pid: parse_num(args[0], "pid")?, bytes: parse_num(args[1], "byte count")? }
        }
        "write" => {
            arity(3)?;
            Operation::Write {
                pid: parse_num(args[0], "pid")?,
                address: parse_num(args[1], "address")?,
                data: parse_data(args[2])?,
            }
        }
        "read" => {
            arity(3)?;
            Operation::Read {
                pid: parse_num(args[0], "pid")?,
                address: parse_num(args[1], "address")?,
                bytes: parse_num(args[2], "byte count")?,
            }
        }
        "free" => {
            arity(2)?;
            Operation::Free { pid: parse_num(args[0], "pid")?, pages: parse_num(args[1], "page count")? }
        }
        "dump" => {
            arity(0)?;
            Operation::Dump
        }
        other => bail!("Unknown operation: {}", other),
    };
    Ok(op)
}

fn parse_num<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, token))
}

/// Raw token bytes, or hex pairs after a `0x` prefix
fn parse_data(token: &str) -> Result<Vec<u8>> {
    let Some(hex) = token.strip_prefix(HEX_PREFIX) else {
        return Ok(token.as_bytes().to_vec());
    };
    if hex.len() % 2 != 0 {
        bail!("Hex data has odd length: {}", token);
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| anyhow!("Invalid hex data: {}", token))
        })
        .collect()
}

fn execute(mmu: &mut Mmu, op: &Operation) -> String {
    let result = match op {
        Operation::Alloc { pid, bytes } => mmu.alloc(*pid, *bytes).map(|_| None),
        Operation::Write { pid, address, data } => mmu.write(*pid, *address, data).map(|_| None),
        Operation::Read { pid, address, bytes } => mmu.read(*pid, *address, *bytes).map(Some),
        Operation::Free { pid, pages } => mmu.free(*pid, *pages).map(|_| None),
        Operation::Dump => return mmu.to_string(),
    };

    match result {
        Ok(None) => "ok".to_string(),
        Ok(Some(bytes)) => format!("ok \"{}\"", bytes.escape_ascii()),
        Err(e) => {
            warn!("{:?} failed: {}", op, e);
            format!("error: {}", e)
        }
    }
}

pub fn write_results<P: AsRef<Path>>(path: P, results: &[String]) -> Result<()> {
    let mut content = results.join("\n");
    content.push('\n');
    fs::write(path.as_ref(), content)
        .with_context(|| format!("Failed to write output file {}", path.as_ref().display()))
}
