use crate::{Duration, Error, Lane, RaceResult, SegmentDisplay, GLYPH_BLANK, GLYPH_DOT};
use core::fmt::{self, Write};
use heapless::{consts::U32, String};
use log::warn;

const BANNER: &str = "HamRadio Ship-Stop-watch";
const READY: &str = "Ready to start";
const RUNNING: &str = "Stopwatch running...";
const STOPPED: &str = "Stopwatch stopped.";

/// Position of the decimal point used as the ready marker
const READY_MARKER_POSITION: usize = 4;

const STANDING_A_AHEAD: u16 = 0xAB;
const STANDING_B_AHEAD: u16 = 0xBA;

/// Text channel and numeric display, everything the race reports goes
/// through here
pub struct ResultSink<W, D> {
    console: W,
    display: D,
}

impl<W, D> ResultSink<W, D>
where
    W: fmt::Write,
    D: SegmentDisplay,
{
    pub fn new(console: W, display: D) -> Self {
        ResultSink { console, display }
    }

    /// Banner and ready marker. The display is updated even when the text
    /// channel fails.
    pub fn startup(&mut self) -> Result<(), Error> {
        self.show_ready_marker();
        writeln_crlf(&mut self.console, format_args!("{}", BANNER))
            .and_then(|_| writeln_crlf(&mut self.console, format_args!("{}", READY)))
            .map_err(|_| Error::TextChannelUnavailable)
    }

    pub fn ready(&mut self) {
        self.show_ready_marker();
        self.line(format_args!("{}", READY));
    }

    pub fn race_started(&mut self) {
        self.line(format_args!("{}", RUNNING));
        self.display.write_raw(READY_MARKER_POSITION, GLYPH_BLANK);
        self.display.set_colon(true);
        self.display.commit();
    }

    /// Display only, the text result follows when the race ends
    pub fn lane_finished(&mut self, elapsed: Duration) {
        self.show_time(elapsed);
    }

    pub fn lane_result(&mut self, lane: Lane, elapsed: Duration) {
        let ms = elapsed.as_millis();
        self.line(format_args!("{}: {}.{:03} mS.", lane, ms / 1000, ms % 1000));
    }

    pub fn race_stopped(&mut self) {
        self.display.set_colon(false);
        self.display.commit();
        self.line(format_args!("{}", STOPPED));
    }

    /// `AB` when lane A is ahead, `BA` when lane B is, dashes on a tie
    pub fn standing(&mut self, result: &RaceResult) {
        match result.winner() {
            Some(Lane::A) => self.display.print_hex(STANDING_A_AHEAD),
            Some(Lane::B) => self.display.print_hex(STANDING_B_AHEAD),
            None => self.display.print_dashes(),
        }
        self.display.commit();
    }

    pub fn show_time(&mut self, elapsed: Duration) {
        self.display.print_seconds(elapsed);
        self.display.commit();
    }

    fn show_ready_marker(&mut self) {
        self.display.clear();
        self.display.write_raw(READY_MARKER_POSITION, GLYPH_DOT);
        self.display.commit();
    }

    fn line(&mut self, args: fmt::Arguments) {
        if writeln_crlf(&mut self.console, args).is_err() {
            warn!("Text channel write failed");
        }
    }
}

/// Whole line is formatted first so it goes out in one piece
fn writeln_crlf<W: fmt::Write>(w: &mut W, args: fmt::Arguments) -> fmt::Result {
    let mut line: String<U32> = String::new();
    line.write_fmt(args)?;
    line.push_str("\r\n").map_err(|_| fmt::Error)?;
    w.write_str(&line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConsole, FakeDisplay};
    use crate::{glyph, GLYPH_DASH};

    fn sink() -> (ResultSink<FakeConsole, FakeDisplay>, FakeConsole, FakeDisplay) {
        let console = FakeConsole::default();
        let display = FakeDisplay::default();
        (
            ResultSink::new(console.clone(), display.clone()),
            console,
            display,
        )
    }

    #[test]
    fn startup_prints_banner_and_ready_marker() {
        let (mut s, console, display) = sink();
        s.startup().unwrap();
        assert_eq!(console.text(), "HamRadio Ship-Stop-watch\r\nReady to start\r\n");
        assert_eq!(display.last_frame(), [0, 0, 0, 0, GLYPH_DOT]);
    }

    #[test]
    fn startup_reports_dead_text_channel() {
        let display = FakeDisplay::default();
        let mut s = ResultSink::new(FakeConsole::failing(), display.clone());
        assert_eq!(s.startup(), Err(Error::TextChannelUnavailable));
        assert_eq!(display.frames().len(), 1);
    }

    #[test]
    fn lane_result_has_three_decimals() {
        let (mut s, console, _) = sink();
        s.lane_result(Lane::A, Duration::from_millis(2345));
        s.lane_result(Lane::B, Duration::from_millis(2890));
        s.lane_result(Lane::B, Duration::from_millis(61_007));
        assert_eq!(
            console.lines(),
            vec!["Line A: 2.345 mS.", "Line B: 2.890 mS.", "Line B: 61.007 mS."]
        );
    }

    #[test]
    fn running_and_stopped_toggle_colon() {
        let (mut s, console, display) = sink();
        s.startup().unwrap();
        console.clear();
        s.race_started();
        assert!(display.colon());
        assert_eq!(display.last_frame()[4], GLYPH_BLANK);
        s.race_stopped();
        assert!(!display.colon());
        assert_eq!(console.lines(), vec!["Stopwatch running...", "Stopwatch stopped."]);
    }

    #[test]
    fn standing_glyphs() {
        let (mut s, _, display) = sink();
        let ms = Duration::from_millis;
        s.standing(&RaceResult::new(ms(1), ms(2)));
        assert_eq!(display.last_frame()[3..], [glyph(0xA), glyph(0xB)]);
        s.standing(&RaceResult::new(ms(2), ms(1)));
        assert_eq!(display.last_frame()[3..], [glyph(0xB), glyph(0xA)]);
        s.standing(&RaceResult::new(ms(2), ms(2)));
        assert_eq!(display.last_frame()[3..], [GLYPH_DASH, GLYPH_DASH]);
    }
}
