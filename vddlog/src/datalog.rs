//! Append-only CSV row log on top of a NOR flash region.
//!
//! The first erase page of the region holds a small header (magic, format
//! version, visible flag, timestamp unit). Every following byte is split into
//! fixed [`LOG_RECORD_SIZE`] records, each holding a length byte followed by
//! one CSV line. Erased flash reads back as `0xFF`, so a record whose length
//! byte is `0xFF` marks the end of the log.

use crate::board::DataLog;
use crate::constants::{LOG_FORMAT_VERSION, LOG_MAGIC, LOG_RECORD_SIZE};
use arrayvec::ArrayString;
use core::fmt::{Debug, Write};
use embedded_storage::nor_flash::{NorFlash, NorFlashError};

/// Longest CSV line a single record can hold
pub const ROW_CAPACITY: usize = LOG_RECORD_SIZE - 1;
const HEADER_SIZE: usize = 8;
const ERASED: u8 = 0xFF;

pub type RowText = ArrayString<ROW_CAPACITY>;

#[repr(C, align(4))]
struct AlignedBuf([u8; LOG_RECORD_SIZE]);

impl AlignedBuf {
    const fn erased() -> Self {
        Self([ERASED; LOG_RECORD_SIZE])
    }
}

/// Unit of the leading timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimestampFormat {
    None = 0,
    Milliseconds = 1,
    Seconds = 2,
    Minutes = 3,
    Hours = 4,
    Days = 5,
}

impl TimestampFormat {
    /// Name of the timestamp column, `None` if rows carry no timestamp
    pub const fn column_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Milliseconds => Some("Time (milliseconds)"),
            Self::Seconds => Some("Time (seconds)"),
            Self::Minutes => Some("Time (minutes)"),
            Self::Hours => Some("Time (hours)"),
            Self::Days => Some("Time (days)"),
        }
    }

    const fn divisor(self) -> u64 {
        match self {
            Self::None | Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
        }
    }

    /// Converts a millisecond timestamp into this unit, truncating
    pub const fn convert(self, timestamp_ms: u64) -> u64 {
        timestamp_ms / self.divisor()
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::None,
            1 => Self::Milliseconds,
            2 => Self::Seconds,
            3 => Self::Minutes,
            4 => Self::Hours,
            5 => Self::Days,
            _ => return None,
        })
    }
}

/// Contents of the header page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogHeader {
    pub visible: bool,
    pub timestamp: TimestampFormat,
}

impl LogHeader {
    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [ERASED; HEADER_SIZE];
        bytes[..4].copy_from_slice(LOG_MAGIC);
        bytes[4] = LOG_FORMAT_VERSION;
        bytes[5] = self.visible as u8;
        bytes[6] = self.timestamp.code();
        bytes
    }

    /// Validates and decodes the first bytes of a header page
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..HEADER_SIZE)?;

        if &bytes[..4] != LOG_MAGIC || bytes[4] != LOG_FORMAT_VERSION {
            return None;
        }

        let visible = match bytes[5] {
            0 => false,
            1 => true,
            _ => return None,
        };

        Some(Self {
            visible,
            timestamp: TimestampFormat::from_code(bytes[6])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogError<E> {
    /// No whole record fits into the region anymore
    Full,
    /// The CSV line does not fit into a single record
    RowTooLong,
    Flash(E),
}

impl<E: NorFlashError> From<E> for LogError<E> {
    fn from(error: E) -> Self {
        Self::Flash(error)
    }
}

impl<E: Debug> core::fmt::Display for LogError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LogError::Full => write!(f, "data log is full"),
            LogError::RowTooLong => write!(f, "row exceeds {} bytes", ROW_CAPACITY),
            LogError::Flash(e) => write!(f, "flash operation failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for LogError<E> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError<E> {
    /// Region bounds or the flash geometry do not line up with erase pages and records
    Misaligned,
    /// Region cannot hold the header page and at least one page of records
    TooSmall,
    Flash(E),
}

impl<E: NorFlashError> From<E> for OpenError<E> {
    fn from(error: E) -> Self {
        Self::Flash(error)
    }
}

impl<E: Debug> core::fmt::Display for OpenError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OpenError::Misaligned => write!(f, "log region is not aligned to erase pages"),
            OpenError::TooSmall => write!(f, "log region is too small"),
            OpenError::Flash(e) => write!(f, "flash operation failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for OpenError<E> {}

/// Row log stored in the flash region `start..start + length`
pub struct FlashLog<F: NorFlash> {
    flash: F,
    start: u32,
    end: u32,
    /// Address of the next erased record
    cursor: u32,

    header: LogHeader,
    mirroring: bool,

    /// Header row describing the rows written since, empty if none has been written
    columns: RowText,
    last_row: Option<RowText>,
}

impl<F: NorFlash> FlashLog<F> {
    /// Opens the log in the given region, restoring its flags and append
    /// cursor. A region without a valid header is formatted as an empty log.
    pub fn open(flash: F, start: u32, length: u32) -> Result<Self, OpenError<F::Error>> {
        let page = F::ERASE_SIZE as u32;

        if page == 0
            || start % page != 0
            || length % page != 0
            || F::ERASE_SIZE % LOG_RECORD_SIZE != 0
            || LOG_RECORD_SIZE % F::WRITE_SIZE != 0
            || LOG_RECORD_SIZE % F::READ_SIZE != 0
        {
            return Err(OpenError::Misaligned);
        }

        let end = start.checked_add(length).ok_or(OpenError::TooSmall)?;
        if length < 2 * page || end as usize > flash.capacity() {
            return Err(OpenError::TooSmall);
        }

        let mut log = Self {
            flash,
            start,
            end,
            cursor: start + page,
            header: LogHeader {
                visible: false,
                timestamp: TimestampFormat::Seconds,
            },
            mirroring: false,
            columns: RowText::new(),
            last_row: None,
        };

        let mut buf = AlignedBuf::erased();
        log.flash.read(start, &mut buf.0)?;

        match LogHeader::parse(&buf.0) {
            Some(header) => {
                log.header = header;
                log.cursor = log.scan_for_end()?;
                debug!("re-opened data log with {} used bytes", log.cursor - log.records_start());
            }
            None => {
                info!("no valid data log header found, formatting region");
                log.format()?;
            }
        }

        Ok(log)
    }

    fn records_start(&self) -> u32 {
        self.start + F::ERASE_SIZE as u32
    }

    fn scan_for_end(&mut self) -> Result<u32, F::Error> {
        let mut buf = AlignedBuf::erased();
        let mut address = self.records_start();

        while address < self.end {
            self.flash.read(address, &mut buf.0)?;
            if buf.0[0] == ERASED {
                break;
            }
            address += LOG_RECORD_SIZE as u32;
        }

        Ok(address)
    }

    fn format(&mut self) -> Result<(), F::Error> {
        self.flash.erase(self.start, self.end)?;
        self.write_header()?;

        self.cursor = self.records_start();
        self.columns.clear();
        self.last_row = None;

        Ok(())
    }

    /// Replaces the header page with the in-memory header
    fn rewrite_header(&mut self) -> Result<(), F::Error> {
        let page = F::ERASE_SIZE as u32;
        self.flash.erase(self.start, self.start + page)?;
        self.write_header()
    }

    fn write_header(&mut self) -> Result<(), F::Error> {
        let mut buf = AlignedBuf::erased();
        buf.0[..HEADER_SIZE].copy_from_slice(&self.header.to_bytes());
        self.flash.write(self.start, &buf.0)
    }

    fn remaining_records(&self) -> u32 {
        (self.end - self.cursor) / LOG_RECORD_SIZE as u32
    }

    fn append(&mut self, text: &str) -> Result<(), LogError<F::Error>> {
        if self.remaining_records() == 0 {
            return Err(LogError::Full);
        }

        let mut buf = AlignedBuf::erased();
        buf.0[0] = text.len() as u8;
        buf.0[1..=text.len()].copy_from_slice(text.as_bytes());

        self.flash.write(self.cursor, &buf.0)?;
        self.cursor += LOG_RECORD_SIZE as u32;

        Ok(())
    }

    pub fn header(&self) -> LogHeader {
        self.header
    }

    /// Consumes the log, returning the underlying flash
    pub fn release(self) -> F {
        self.flash
    }
}

impl<F: NorFlash> DataLog for FlashLog<F> {
    type Error = LogError<F::Error>;

    fn set_serial_mirroring(&mut self, enabled: bool) {
        self.mirroring = enabled;
    }

    fn set_timestamp(&mut self, format: TimestampFormat) -> Result<(), Self::Error> {
        if self.header.timestamp == format {
            return Ok(());
        }
        self.header.timestamp = format;

        Ok(self.rewrite_header()?)
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), Self::Error> {
        if self.header.visible == visible {
            return Ok(());
        }
        self.header.visible = visible;

        Ok(self.rewrite_header()?)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        info!("clearing data log");
        Ok(self.format()?)
    }

    fn log_row(&mut self, timestamp_ms: u64, columns: &[(&str, &str)]) -> Result<(), Self::Error> {
        if self.remaining_records() == 0 {
            return Err(LogError::Full);
        }

        let timestamp = self.header.timestamp;
        let mut names = RowText::new();
        let mut row = RowText::new();
        let mut separator = "";

        if let Some(name) = timestamp.column_name() {
            write!(names, "{}", name).map_err(|_| LogError::RowTooLong)?;
            write!(row, "{}", timestamp.convert(timestamp_ms)).map_err(|_| LogError::RowTooLong)?;
            separator = ",";
        }

        for (name, value) in columns {
            write!(names, "{}{}", separator, name).map_err(|_| LogError::RowTooLong)?;
            write!(row, "{}{}", separator, value).map_err(|_| LogError::RowTooLong)?;
            separator = ",";
        }

        if names != self.columns {
            if self.remaining_records() < 2 {
                return Err(LogError::Full);
            }
            self.append(&names)?;
            self.columns = names;
        }

        self.append(&row)?;
        self.last_row = Some(row);

        Ok(())
    }

    fn is_full(&self) -> bool {
        self.remaining_records() == 0
    }

    fn mirrored_row(&self) -> Option<&str> {
        if self.mirroring {
            self.last_row.as_ref().map(|row| row.as_str())
        } else {
            None
        }
    }
}

/// Why a raw dump of the log region could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The dump does not start with a valid header page
    MissingHeader,
    /// The record at this byte offset of the dump is not a valid CSV line
    CorruptRecord(usize),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::MissingHeader => write!(f, "dump does not start with a data log header"),
            DecodeError::CorruptRecord(offset) => write!(f, "corrupt record at offset {:#x}", offset),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Reads back a raw copy of the log region, `page_size` being the erase
/// page size of the flash it was taken from.
pub fn decode(dump: &[u8], page_size: usize) -> Result<(LogHeader, Records<'_>), DecodeError> {
    let header = dump
        .get(..page_size)
        .and_then(LogHeader::parse)
        .ok_or(DecodeError::MissingHeader)?;

    let records = Records {
        dump,
        offset: page_size,
    };

    Ok((header, records))
}

/// CSV lines of a log dump, in the order they were written
pub struct Records<'d> {
    dump: &'d [u8],
    offset: usize,
}

impl<'d> Iterator for Records<'d> {
    type Item = Result<&'d str, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let record = self.dump.get(offset..offset + LOG_RECORD_SIZE)?;

        let length = record[0];
        if length == ERASED {
            return None;
        }
        self.offset += LOG_RECORD_SIZE;

        let text = record
            .get(1..=length as usize)
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
            .ok_or(DecodeError::CorruptRecord(offset));

        Some(text)
    }
}
