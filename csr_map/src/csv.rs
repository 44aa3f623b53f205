//! Parsing and writing of the `csr.csv` tabular address map format.
//!
//! The format is line-oriented: `#` comment lines, `csr_base` rows naming a
//! peripheral bank and its base address, `csr_register` rows with the flat
//! register list, and `constant` rows. `memory_region` rows produced by other
//! generators are accepted and ignored. As there is no formal specification of
//! this format, the parsing logic here uses the "implementation as spec".

use crate::{AccessMode, CsrMap, CsrRegister};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::{digit1, hex_digit1, line_ending, not_line_ending},
    combinator::{eof, map, map_res},
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};
use std::{io::Write, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Parsing failed to match the grammar")]
    ParseMatch,
    #[error("Duplicate register name - `{0}`")]
    DuplicateRegister(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid integer")]
    Integer(#[from] std::num::ParseIntError),
    #[error("Unknown access mode - `{0}`")]
    Mode(String),
}

/// One parsed line of the file
#[derive(Debug)]
enum Row<'a> {
    Comment,
    Base(&'a str, u32),
    Register(&'a str, u32, u32, AccessMode),
    Constant(&'a str, &'a str),
    MemoryRegion,
}

fn eol(input: &str) -> IResult<&str, &str> {
    alt((line_ending, eof))(input)
}

fn comment(input: &str) -> IResult<&str, Row> {
    let (remaining, _) = terminated(preceded(tag("#"), not_line_ending), eol)(input)?;
    Ok((remaining, Row::Comment))
}

fn from_hex(input: &str) -> Result<u32, ParseError> {
    Ok(u32::from_str_radix(input, 16)?)
}

fn hex_number(input: &str) -> IResult<&str, u32> {
    map_res(preceded(tag("0x"), hex_digit1), from_hex)(input)
}

fn dec_number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse)(input)
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == ',' || c == '\n' || c == '\r')(input)
}

fn mode(input: &str) -> IResult<&str, AccessMode> {
    map_res(field, |s: &str| match s {
        "ro" => Ok(AccessMode::ReadOnly),
        "wo" => Ok(AccessMode::WriteOnly),
        "rw" => Ok(AccessMode::ReadWrite),
        _ => Err(ParseError::Mode(s.to_owned())),
    })(input)
}

fn base_row(input: &str) -> IResult<&str, Row> {
    let (remaining, _) = tag("csr_base,")(input)?;
    let (remaining, name) = field(remaining)?;
    let (remaining, addr) = preceded(tag(","), hex_number)(remaining)?;
    let (remaining, _) = terminated(tag(",,"), eol)(remaining)?;
    Ok((remaining, Row::Base(name, addr)))
}

fn register_row(input: &str) -> IResult<&str, Row> {
    let (remaining, _) = tag("csr_register,")(input)?;
    let (remaining, name) = field(remaining)?;
    let (remaining, addr) = preceded(tag(","), hex_number)(remaining)?;
    let (remaining, words) = preceded(tag(","), dec_number)(remaining)?;
    let (remaining, mode) = terminated(preceded(tag(","), mode), eol)(remaining)?;
    Ok((remaining, Row::Register(name, addr, words, mode)))
}

fn constant_row(input: &str) -> IResult<&str, Row> {
    let (remaining, _) = tag("constant,")(input)?;
    let (remaining, name) = field(remaining)?;
    let (remaining, value) = preceded(tag(","), take_till(|c| c == ','))(remaining)?;
    let (remaining, _) = terminated(tag(",,"), eol)(remaining)?;
    Ok((remaining, Row::Constant(name, value)))
}

fn memory_region_row(input: &str) -> IResult<&str, Row> {
    let (remaining, _) = tag("memory_region,")(input)?;
    let (remaining, _) = terminated(not_line_ending, eol)(remaining)?;
    Ok((remaining, Row::MemoryRegion))
}

fn blank(input: &str) -> IResult<&str, Row> {
    map(line_ending, |_| Row::Comment)(input)
}

fn row(input: &str) -> IResult<&str, Row> {
    alt((
        comment,
        base_row,
        register_row,
        constant_row,
        memory_region_row,
        blank,
    ))(input)
}

/// Parse the contents of a csr.csv file into a [`CsrMap`]
/// # Errors
/// Returns an error when the input doesn't match the grammar or a register name
/// appears twice
pub fn parse_csv(input: &str) -> Result<CsrMap, Error> {
    let (remaining, rows) = many0(row)(input).map_err(|_| Error::ParseMatch)?;
    if !remaining.is_empty() {
        return Err(Error::ParseMatch);
    }
    let mut csr_map = CsrMap::default();
    for entry in rows {
        match entry {
            Row::Comment | Row::MemoryRegion => (),
            Row::Base(name, addr) => {
                csr_map.banks.insert(name.into(), addr);
            }
            Row::Register(name, addr, words, mode) => {
                let reg = CsrRegister { addr, words, mode };
                if csr_map.registers.insert(name.into(), reg).is_some() {
                    return Err(Error::DuplicateRegister(name.to_owned()));
                }
            }
            Row::Constant(name, value) => {
                csr_map.constants.insert(name.into(), value.to_owned());
            }
        }
    }
    Ok(csr_map)
}

/// Read and parse a csr.csv file from disk
/// # Errors
/// Returns errors on file IO as well as everything from [`parse_csv`]
pub fn read_csv_file<T>(filename: T) -> Result<CsrMap, Error>
where
    T: AsRef<Path>,
{
    let contents = std::fs::read_to_string(filename)?;
    parse_csv(&contents)
}

/// Serialize a [`CsrMap`] into the csr.csv format.
///
/// Banks are emitted in address order, each followed by its registers, so the
/// output is stable and diffable across compositions.
#[must_use]
pub fn to_csv_string(csr_map: &CsrMap) -> String {
    let mut out = String::new();
    out.push_str("#--------------------------------------------------------------------------------\n");
    out.push_str("# Auto-generated CSR map\n");
    out.push_str("#--------------------------------------------------------------------------------\n");

    let mut banks: Vec<(&str, u32)> = csr_map
        .banks
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    banks.sort_by_key(|&(_, base)| base);

    let mut registers: Vec<(&str, &CsrRegister)> = csr_map
        .registers
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    registers.sort_by_key(|&(_, reg)| reg.addr);

    for (i, &(name, base)) in banks.iter().enumerate() {
        // Bank extent is bounded by the next bank (or the end of the map)
        let limit = banks.get(i + 1).map_or(u32::MAX, |&(_, next)| next);
        out.push_str(&format!("csr_base,{name},0x{base:08x},,\n"));
        for &(reg_name, reg) in registers
            .iter()
            .filter(|&&(_, r)| r.addr >= base && r.addr < limit)
        {
            out.push_str(&format!(
                "csr_register,{reg_name},0x{:08x},{},{}\n",
                reg.addr,
                reg.words,
                reg.mode.as_str()
            ));
        }
    }

    let mut constants: Vec<(&str, &str)> = csr_map
        .constants
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    constants.sort_unstable();
    for (name, value) in constants {
        out.push_str(&format!("constant,{name},{value},,\n"));
    }
    out
}

/// Write a [`CsrMap`] to disk in the csr.csv format
/// # Errors
/// Returns errors on file IO
pub fn write_csv_file<T>(filename: T, csr_map: &CsrMap) -> Result<(), Error>
where
    T: AsRef<Path>,
{
    let mut file = std::fs::File::create(filename)?;
    file.write_all(to_csv_string(csr_map).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment() {
        let (remaining, _) = comment("# Auto-generated\ncsr_base").unwrap();
        assert_eq!(remaining, "csr_base");
    }

    #[test]
    fn test_base_row() {
        let test_str = "csr_base,leds,0xe0002000,,\n";
        let (remaining, row) = base_row(test_str).unwrap();
        assert_eq!(remaining, "");
        assert!(matches!(row, Row::Base("leds", 0xE000_2000)));
    }

    #[test]
    fn test_register_row() {
        let test_str = "csr_register,leds_out,0xe0002000,1,wo\n";
        let (remaining, row) = register_row(test_str).unwrap();
        assert_eq!(remaining, "");
        assert!(matches!(
            row,
            Row::Register("leds_out", 0xE000_2000, 1, AccessMode::WriteOnly)
        ));
    }

    #[test]
    fn test_register_row_no_trailing_newline() {
        let test_str = "csr_register,dna_data,0xe0001008,1,ro";
        let (remaining, row) = register_row(test_str).unwrap();
        assert_eq!(remaining, "");
        assert!(matches!(
            row,
            Row::Register("dna_data", 0xE000_1008, 1, AccessMode::ReadOnly)
        ));
    }

    #[test]
    fn test_constant_row() {
        let test_str = "constant,ident,Ebaz 4205 SoC,,\n";
        let (remaining, row) = constant_row(test_str).unwrap();
        assert_eq!(remaining, "");
        assert!(matches!(row, Row::Constant("ident", "Ebaz 4205 SoC")));
    }

    #[test]
    fn test_bad_mode() {
        assert!(register_row("csr_register,leds_out,0xe0002000,1,xx\n").is_err());
    }

    #[test]
    fn test_parse_file() {
        let input = "\
#--------------------------------------------------------------------------------
# Auto-generated CSR map
#--------------------------------------------------------------------------------
csr_base,ctrl,0xe0000000,,
csr_register,ctrl_scratch,0xe0000004,1,rw
csr_base,leds,0xe0002000,,
csr_register,leds_out,0xe0002000,1,wo
memory_region,sram,0x10000000,4096,cached
constant,ident,Test SoC,,
";
        let csr_map = parse_csv(input).unwrap();
        assert_eq!(*csr_map.banks.get("ctrl").unwrap(), 0xE000_0000);
        assert_eq!(
            *csr_map.register("leds_out").unwrap(),
            CsrRegister {
                addr: 0xE000_2000,
                words: 1,
                mode: AccessMode::WriteOnly
            }
        );
        assert_eq!(
            *csr_map.register("ctrl_scratch").unwrap(),
            CsrRegister {
                addr: 0xE000_0004,
                words: 1,
                mode: AccessMode::ReadWrite
            }
        );
        assert_eq!(csr_map.constant("ident"), Some("Test SoC"));
        // The memory region row parses but contributes nothing
        assert_eq!(csr_map.registers.len(), 2);
    }

    #[test]
    fn test_parse_duplicate() {
        let input = "csr_register,leds_out,0xe0002000,1,wo\ncsr_register,leds_out,0xe0002000,1,wo\n";
        assert!(matches!(
            parse_csv(input),
            Err(Error::DuplicateRegister(name)) if name == "leds_out"
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_csv("this is not a csr map\n"),
            Err(Error::ParseMatch)
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut csr_map = CsrMap::default();
        csr_map.banks.insert("ctrl".into(), 0xE000_0000);
        csr_map.banks.insert("dna".into(), 0xE000_1000);
        csr_map.registers.insert(
            "ctrl_scratch".into(),
            CsrRegister {
                addr: 0xE000_0004,
                words: 1,
                mode: AccessMode::ReadWrite,
            },
        );
        csr_map.registers.insert(
            "dna_data".into(),
            CsrRegister {
                addr: 0xE000_1008,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
        );
        csr_map
            .constants
            .insert("ident".into(), "Test SoC".to_owned());
        let round_tripped = parse_csv(&to_csv_string(&csr_map)).unwrap();
        assert_eq!(round_tripped, csr_map);
    }
}
