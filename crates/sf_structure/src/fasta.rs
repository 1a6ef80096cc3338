//! Minimal FASTA reader.
//!
//! A record is a block of comment lines (`>`, `;` or `#`), followed by
//! sequence lines, optionally followed by a dot-bracket reference folding.
//! The record name is the first word of the (joined) comment. A trailing
//! `*` terminates the sequence data.
//!

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use log::debug;

use crate::Base;
use crate::FoldingPairs;
use crate::Sequence;
use crate::StructureError;

#[derive(Default)]
struct Record {
    comments: Vec<String>,
    bases: String,
    structure: String,
    terminated: bool,
}

impl Record {
    fn finish(self) -> Result<Sequence, StructureError> {
        let seq = Sequence::new(self.bases.chars().map(Base::from).collect())?
            .with_comment(&self.comments.join(" / "));
        if self.structure.is_empty() {
            return Ok(seq);
        }
        seq.with_reference(FoldingPairs::try_from(self.structure.as_str())?)
    }
}

fn is_structure_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '.' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>'))
}

/// Read all records from a FASTA stream.
pub fn read_sequences<R: BufRead>(reader: R) -> Result<Vec<Sequence>, StructureError> {
    let mut records = Vec::new();
    let mut current: Option<Record> = None;

    for (lno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let Some(first) = line.chars().next() else {
            continue;
        };
        let has_bases = current.as_ref().is_some_and(|r| !r.bases.is_empty());
        let in_structure = current.as_ref().is_some_and(|r| !r.structure.is_empty());

        if has_bases && (matches!(first, '.' | '(') || in_structure) && is_structure_line(line) {
            if let Some(rec) = current.as_mut() {
                rec.structure.push_str(line);
            }
        } else if matches!(first, '>' | ';' | '#') {
            let comment = line[1..].trim().to_string();
            if has_bases {
                if first == '>' {
                    if let Some(done) = current.take() {
                        records.push(done.finish()?);
                    }
                    current = Some(Record { comments: vec![comment], ..Default::default() });
                }
            } else {
                current.get_or_insert_with(Record::default).comments.push(comment);
            }
        } else {
            let rec = current.get_or_insert_with(Record::default);
            if rec.terminated || !rec.structure.is_empty() {
                return Err(StructureError::Fasta(format!(
                    "unexpected sequence data on line {}",
                    lno + 1
                )));
            }
            match line.strip_suffix('*') {
                Some(rest) => {
                    rec.bases.push_str(rest.trim());
                    rec.terminated = true;
                }
                None => rec.bases.push_str(line),
            }
        }
    }
    if let Some(done) = current.take() {
        records.push(done.finish()?);
    }
    debug!("Read {} FASTA record(s).", records.len());
    Ok(records)
}

/// Read exactly the first record from a FASTA stream.
pub fn read_sequence<R: BufRead>(reader: R) -> Result<Sequence, StructureError> {
    read_sequences(reader)?
        .into_iter()
        .next()
        .ok_or_else(|| StructureError::Fasta("no sequence found".to_string()))
}

/// Read all records from a FASTA file, or from every file of a directory
/// in file name order. Hidden files and subdirectories are skipped.
pub fn read_path(path: &Path) -> Result<Vec<Sequence>, StructureError> {
    if !path.is_dir() {
        return read_sequences(BufReader::new(File::open(path)?));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type()?.is_file() && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut seqs = Vec::new();
    for file in &files {
        seqs.extend(read_sequences(BufReader::new(File::open(file)?))?);
    }
    debug!("Read {} sequences from {} files in {}.", seqs.len(), files.len(), path.display());
    Ok(seqs)
}
