//! Note chart: immutable note descriptors, lane mapping and the CSV loader.
//!
//! A chart is the ordered list of every musical event in a song. Rows flagged
//! `user_played` become falling notes the player has to hit; the rest are
//! played in the background at their start time.

use crate::error::ChartError;

/// Index of a descriptor inside the loaded chart. Identity of a note.
pub type NoteId = usize;

/// One musical event of the chart. Never mutated after load.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteDescriptor {
    pub user_played: bool,
    pub instrument: String,
    pub velocity: u8, // 0..=127
    pub pitch: u8,    // MIDI note number
    pub start: f64,   // seconds from session start
    pub end: f64,     // seconds, >= start
}

impl NoteDescriptor {
    pub fn lane(&self) -> Lane {
        Lane::from_pitch(self.pitch)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One of the four fixed tracks notes fall down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lane {
    One,
    Two,
    Three,
    Four,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::One, Lane::Two, Lane::Three, Lane::Four];

    /// Pitch-modulo class: pitch 60 (middle C) lands in lane one.
    pub fn from_pitch(pitch: u8) -> Self {
        Self::ALL[pitch as usize % Self::ALL.len()]
    }

    /// 1-based lane number, as shown to players and used in textual actions.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1..=4 => Some(Self::ALL[n as usize - 1]),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Lane::One => 0,
            Lane::Two => 1,
            Lane::Three => 2,
            Lane::Four => 3,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

const COLUMNS: usize = 6;

/// Parse chart text (header line, then one note per line).
///
/// Columns: `user_played, instrument_name, velocity, pitch, start, end`.
/// Blank lines are skipped. The first bad row aborts the load with its 1-based
/// line number so the caller never hands a malformed descriptor to the game.
pub fn parse_chart(text: &str) -> Result<Vec<NoteDescriptor>, ChartError> {
    let mut notes = Vec::new();
    let mut seen_header = false;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if !seen_header {
            seen_header = true;
            continue;
        }
        notes.push(parse_row(idx + 1, line)?);
    }
    log::info!("loaded chart with {} notes", notes.len());
    Ok(notes)
}

fn parse_row(line_no: usize, line: &str) -> Result<NoteDescriptor, ChartError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(ChartError::row(
            line_no,
            format!("expected {COLUMNS} columns, found {}", fields.len()),
        ));
    }

    let user_played = match fields[0].to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(ChartError::row(
                line_no,
                format!("user_played must be true or false, got {other:?}"),
            ));
        }
    };
    let instrument = fields[1].to_string();
    let velocity = parse_midi(line_no, "velocity", fields[2])?;
    let pitch = parse_midi(line_no, "pitch", fields[3])?;
    let start = parse_seconds(line_no, "start", fields[4])?;
    let end = parse_seconds(line_no, "end", fields[5])?;
    if end < start {
        return Err(ChartError::row(
            line_no,
            format!("end {end} is before start {start}"),
        ));
    }

    Ok(NoteDescriptor {
        user_played,
        instrument,
        velocity,
        pitch,
        start,
        end,
    })
}

fn parse_midi(line_no: usize, name: &str, field: &str) -> Result<u8, ChartError> {
    let value: i64 = field
        .parse()
        .map_err(|_| ChartError::row(line_no, format!("{name} is not an integer: {field:?}")))?;
    if !(0..=127).contains(&value) {
        return Err(ChartError::row(
            line_no,
            format!("{name} {value} outside 0..=127"),
        ));
    }
    Ok(value as u8)
}

fn parse_seconds(line_no: usize, name: &str, field: &str) -> Result<f64, ChartError> {
    let value: f64 = field
        .parse()
        .map_err(|_| ChartError::row(line_no, format!("{name} is not a number: {field:?}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ChartError::row(
            line_no,
            format!("{name} must be a finite, non-negative time, got {value}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "user_played,instrument_name,velocity,pitch,start,end\n\
                          True,Piano,80,60,0,1\n\
                          False,Bass,100,36,0.5,0.75\n";

    #[test]
    fn parses_rows_after_header() {
        let chart = parse_chart(SAMPLE).unwrap();
        assert_eq!(chart.len(), 2);
        assert!(chart[0].user_played);
        assert_eq!(chart[0].instrument, "Piano");
        assert_eq!(chart[0].velocity, 80);
        assert_eq!(chart[0].pitch, 60);
        assert_eq!(chart[0].start, 0.0);
        assert_eq!(chart[0].end, 1.0);
        assert!(!chart[1].user_played);
        assert!((chart[1].duration() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn skips_blank_lines_and_crlf() {
        let text = "\r\nuser_played,instrument_name,velocity,pitch,start,end\r\n\r\ntrue, Violin ,64,61,1.5,2\r\n";
        let chart = parse_chart(text).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].instrument, "Violin");
        assert_eq!(chart[0].lane(), Lane::Two);
    }

    #[test]
    fn header_only_is_empty_chart() {
        let chart = parse_chart("user_played,instrument_name,velocity,pitch,start,end").unwrap();
        assert!(chart.is_empty());
        assert!(parse_chart("").unwrap().is_empty());
    }

    #[test]
    fn reports_line_of_bad_row() {
        let text = "header\ntrue,Piano,80,60,0,1\ntrue,Piano,loud,60,0,1\n";
        match parse_chart(text) {
            Err(ChartError::MalformedChartRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("velocity"), "reason was {reason}");
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = parse_chart("header\ntrue,Piano,80,60,0\n").unwrap_err();
        assert_eq!(
            err,
            ChartError::MalformedChartRow {
                line: 2,
                reason: "expected 6 columns, found 5".into()
            }
        );
    }

    #[test]
    fn rejects_out_of_range_and_inverted_times() {
        assert!(parse_chart("h\ntrue,Piano,128,60,0,1").is_err());
        assert!(parse_chart("h\ntrue,Piano,80,-1,0,1").is_err());
        assert!(parse_chart("h\ntrue,Piano,80,60,-0.5,1").is_err());
        assert!(parse_chart("h\ntrue,Piano,80,60,2,1").is_err());
        assert!(parse_chart("h\ntrue,Piano,80,60,NaN,1").is_err());
        assert!(parse_chart("h\nyes,Piano,80,60,0,1").is_err());
    }

    #[test]
    fn lanes_follow_pitch_modulo() {
        assert_eq!(Lane::from_pitch(60), Lane::One);
        assert_eq!(Lane::from_pitch(61), Lane::Two);
        assert_eq!(Lane::from_pitch(62), Lane::Three);
        assert_eq!(Lane::from_pitch(63), Lane::Four);
        assert_eq!(Lane::from_pitch(64), Lane::One);
        assert_eq!(Lane::from_number(3), Some(Lane::Three));
        assert_eq!(Lane::from_number(0), None);
        assert_eq!(Lane::from_number(5), None);
        for lane in Lane::ALL {
            assert_eq!(Lane::from_number(lane.number()), Some(lane));
        }
    }
}
