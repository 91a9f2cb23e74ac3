//! The streaming state machine: drives the parser phases from
//! the first byte to `end()` and owns every buffer it needs along the way.

use std::f64::consts::PI;

use tracing::{debug, instrument, warn};

use crate::accumulator::{infer_num_ports, SweepAccumulator};
use crate::chunker::Chunker;
use crate::emitter::{Consumer, Emitter};
use crate::error::{Result, TouchstoneError};
use crate::keywords::{parse_keyword_line, Keyword};
use crate::numeric::{assemble_matrix, convert_block, fill_lower, fill_upper, noise_db_to_linear, swap21_12};
use crate::options::parse_option_line;
use crate::params::{MatrixFormat, NumberFormat, ParameterKind, TwoPortOrder};
use crate::sweep_store::SweepStore;
use crate::tokenizer::tokenize;
use crate::units::FrequencyUnit;

/// The phase currently driving line interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    OptionLineExpected,
    NumPortsExpected,
    Keywords,
    References,
    SkipInfo,
    DataLines,
    NoiseData,
    /// Reached after `[END]`; any further non-blank line is an error.
    Done,
}

/// A streaming Touchstone parser. Feed it byte chunks with
/// [`Parser::receive`] and finish the session with [`Parser::end`];
/// both take a [`Consumer`] that receives typed [`crate::emitter::Packet`]s
/// in calling order. Dropping the parser releases every owned buffer
/// — there is no separate `cleanup` call.
pub struct Parser {
    state: State,
    file_version: Option<u8>,

    frequency_unit: FrequencyUnit,
    number_format: NumberFormat,
    parameter_kind: ParameterKind,
    reference_resistance: f64,
    reference_resistances: Option<Vec<f64>>,

    num_ports: Option<usize>,
    num_vals_per_set: Option<usize>,
    matrix_format: MatrixFormat,
    two_port_order: TwoPortOrder,

    sweep_points_hint: Option<usize>,
    sweep_points_noise_hint: Option<usize>,

    chunker: Chunker,
    accumulator: SweepAccumulator,
    store: SweepStore,
    emitter: Emitter,

    reference_pending: Vec<f64>,
    last_freq: Option<f64>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            state: State::Start,
            file_version: None,
            frequency_unit: FrequencyUnit::default(),
            number_format: NumberFormat::default(),
            parameter_kind: ParameterKind::default(),
            reference_resistance: 50.0,
            reference_resistances: None,
            num_ports: None,
            num_vals_per_set: None,
            matrix_format: MatrixFormat::default(),
            two_port_order: TwoPortOrder::default(),
            sweep_points_hint: None,
            sweep_points_noise_hint: None,
            chunker: Chunker::new(),
            accumulator: SweepAccumulator::new(),
            store: SweepStore::new(1),
            emitter: Emitter::new(),
            reference_pending: Vec::new(),
            last_freq: None,
        }
    }

    /// Re-arms the parser for a new input stream, keeping buffer
    /// capacity where that's safe.
    pub fn reset(&mut self) {
        *self = Parser::new();
    }

    /// Feeds a chunk of input bytes through the parser, emitting any
    /// packets the new data completes.
    #[instrument(skip(self, chunk, consumer))]
    pub fn receive(&mut self, chunk: &[u8], consumer: &mut impl Consumer) -> Result<()> {
        let lines = self.chunker.push(chunk)?;
        for line in lines {
            self.process_line(&line, consumer)?;
        }
        Ok(())
    }

    /// Signals end-of-input: flushes any pending sweep, performs
    /// deferred version-1 port-count inference if needed, and emits
    /// the frame-end packet.
    #[instrument(skip(self, consumer))]
    pub fn end(&mut self, consumer: &mut impl Consumer) -> Result<()> {
        let lines = self.chunker.finish()?;
        for line in lines {
            self.process_line(&line, consumer)?;
        }

        if self.state != State::Done {
            if self.file_version == Some(1) && self.num_ports.is_none() && !self.accumulator.is_empty() {
                let tokens = self.accumulator.take_all();
                let n = infer_num_ports(tokens.len()).ok_or_else(|| {
                    TouchstoneError::semantic(
                        "could not infer number of ports from trailing version-1 data",
                    )
                })?;
                self.establish_num_ports(n, consumer);
                self.complete_data_set(tokens)?;
            } else if !self.accumulator.is_empty() {
                return Err(TouchstoneError::semantic(
                    "incomplete data set at end of input",
                ));
            }
            self.flush_pending(consumer);
        }

        self.emitter.end(consumer);
        Ok(())
    }

    fn process_line(&mut self, line: &str, consumer: &mut impl Consumer) -> Result<()> {
        match self.state {
            State::Done => Err(TouchstoneError::syntax(line, "content found after [END]")),
            State::Start => self.handle_start(line),
            State::OptionLineExpected => self.handle_option_line_expected(line),
            State::NumPortsExpected | State::Keywords => self.handle_keywords(line, consumer),
            State::References => self.handle_references(line, consumer),
            State::SkipInfo => self.handle_skip_info(line),
            State::DataLines | State::NoiseData => self.handle_data_or_noise(line, consumer),
        }
    }

    // -- START --------------------------------------------------------

    fn handle_start(&mut self, line: &str) -> Result<()> {
        if line.starts_with('#') {
            self.file_version = Some(1);
            self.apply_option_line(line)?;
            self.state = State::DataLines;
            debug!("version 1 file: option line read, entering DATA_LINES");
            Ok(())
        } else if line.starts_with('[') {
            match parse_keyword_line(line)? {
                Keyword::Version(v) if v == "2.0" => {
                    self.file_version = Some(2);
                    self.state = State::OptionLineExpected;
                    debug!("version 2 file declared");
                    Ok(())
                }
                Keyword::Version(other) => Err(TouchstoneError::unsupported(format!(
                    "unsupported Touchstone version {other:?}"
                ))),
                _ => Err(TouchstoneError::syntax(
                    line,
                    "the first keyword line must be [VERSION] 2.0",
                )),
            }
        } else {
            Err(TouchstoneError::syntax(
                line,
                "expected an option line (#) or [VERSION] 2.0",
            ))
        }
    }

    // -- OPTION_LINE_EXPECTED ------------------------------------------

    fn handle_option_line_expected(&mut self, line: &str) -> Result<()> {
        if line.starts_with('#') {
            self.apply_option_line(line)?;
            self.state = State::NumPortsExpected;
            Ok(())
        } else {
            Err(TouchstoneError::syntax(
                line,
                "option line (#) must follow [VERSION] 2.0",
            ))
        }
    }

    fn apply_option_line(&mut self, line: &str) -> Result<()> {
        let opts = parse_option_line(line)?;
        self.frequency_unit = opts.frequency_unit;
        self.number_format = opts.number_format;
        self.parameter_kind = opts.parameter_kind;
        self.reference_resistance = opts.reference_resistance;
        Ok(())
    }

    // -- KEYWORDS / NUM_PORTS_EXPECTED ----------------------------------

    fn handle_keywords(&mut self, line: &str, consumer: &mut impl Consumer) -> Result<()> {
        if line.starts_with('[') {
            let keyword = parse_keyword_line(line)?;
            self.apply_keyword(keyword, line, consumer)
        } else {
            // a bare data token while in KEYWORDS means network data has begun
            self.num_ports.ok_or_else(|| {
                TouchstoneError::semantic("data encountered before [NUMBER OF PORTS]")
            })?;
            self.state = State::DataLines;
            self.handle_data_or_noise(line, consumer)
        }
    }

    fn apply_keyword(
        &mut self,
        keyword: Keyword,
        line: &str,
        consumer: &mut impl Consumer,
    ) -> Result<()> {
        match keyword {
            Keyword::Version(_) => Err(TouchstoneError::semantic(
                "[VERSION] must be the first line of the file",
            )),
            Keyword::NumberOfPorts(n) => {
                self.establish_num_ports(n, consumer);
                self.state = State::Keywords;
                Ok(())
            }
            Keyword::TwoPortOrder(order) => {
                self.two_port_order = order;
                Ok(())
            }
            Keyword::NumberOfFrequencies(n) => {
                self.sweep_points_hint = Some(n);
                Ok(())
            }
            Keyword::NumberOfNoiseFrequencies(n) => {
                self.sweep_points_noise_hint = Some(n);
                Ok(())
            }
            Keyword::Reference(tokens) => {
                let n = self
                    .num_ports
                    .ok_or_else(|| TouchstoneError::semantic("[REFERENCE] requires [NUMBER OF PORTS] first"))?;
                self.reference_pending = tokens;
                self.try_complete_reference(n, consumer);
                Ok(())
            }
            Keyword::MatrixFormat(fmt) => {
                let n = self.num_ports.ok_or_else(|| {
                    TouchstoneError::semantic("[MATRIX FORMAT] requires [NUMBER OF PORTS] first")
                })?;
                self.matrix_format = fmt;
                self.num_vals_per_set = Some(fmt.payload_len(n) + 1);
                Ok(())
            }
            Keyword::MixedModeOrder => Err(TouchstoneError::unsupported(
                "[MIXED-MODE ORDER] is not supported",
            )),
            Keyword::BeginInformation => {
                self.state = State::SkipInfo;
                Ok(())
            }
            Keyword::EndInformation => Err(TouchstoneError::syntax(
                line,
                "[END INFORMATION] without a matching [BEGIN INFORMATION]",
            )),
            Keyword::NetworkData => {
                self.num_ports.ok_or_else(|| {
                    TouchstoneError::semantic("[NETWORK DATA] requires [NUMBER OF PORTS] first")
                })?;
                self.state = State::DataLines;
                Ok(())
            }
            Keyword::NoiseData => {
                self.begin_noise_section(consumer)
            }
            Keyword::End => {
                self.flush_pending(consumer);
                self.state = State::Done;
                Ok(())
            }
        }
    }

    fn try_complete_reference(&mut self, n: usize, consumer: &mut impl Consumer) {
        if self.reference_pending.len() >= n {
            self.reference_pending.truncate(n);
            let values = std::mem::take(&mut self.reference_pending);
            self.reference_resistances = Some(values);
            self.emit_current_references(consumer);
            self.state = State::Keywords;
        } else {
            self.state = State::References;
        }
    }

    // -- REFERENCES -----------------------------------------------------

    fn handle_references(&mut self, line: &str, consumer: &mut impl Consumer) -> Result<()> {
        if line.starts_with('[') {
            return Err(TouchstoneError::syntax(
                line,
                "keyword encountered while [REFERENCE] values were still incomplete",
            ));
        }
        let tokens = tokenize(line)?;
        self.reference_pending.extend(tokens);
        let n = self.num_ports.expect("References state implies num_ports is known");
        self.try_complete_reference(n, consumer);
        Ok(())
    }

    // -- SKIP_INFO --------------------------------------------------------

    fn handle_skip_info(&mut self, line: &str) -> Result<()> {
        if line.starts_with('[') {
            if let Keyword::EndInformation = parse_keyword_line(line)? {
                self.state = State::Keywords;
            }
        }
        Ok(())
    }

    // -- DATA_LINES / NOISE_DATA ------------------------------------------

    fn handle_data_or_noise(&mut self, line: &str, consumer: &mut impl Consumer) -> Result<()> {
        if line.starts_with('[') {
            let keyword = parse_keyword_line(line)?;
            return self.apply_keyword(keyword, line, consumer);
        }

        let tokens = tokenize(line)?;

        if self.state == State::DataLines
            && self.file_version == Some(1)
            && self.num_vals_per_set.is_some()
            && self.accumulator.is_empty()
        {
            if let (Some(last), Some(&first)) = (self.last_freq, tokens.first()) {
                let candidate_freq = self.frequency_unit.to_hz(first);
                if candidate_freq < last {
                    self.begin_noise_section(consumer)?;
                    return self.handle_data_or_noise(line, consumer);
                }
            }
        }

        if self.state == State::DataLines && self.num_vals_per_set.is_none() {
            // Version-1 port-count inference in progress. A data row may
            // span several input lines, so the raw tokens of the first
            // sweep point are simply accumulated until a later line's
            // leading value looks like the next point's (ascending)
            // frequency — that's the signal the first point is actually
            // complete. A file with only one sweep point never sees that
            // signal; inference is deferred to end-of-stream for it.
            let leading_freq = tokens.first().map(|&v| self.frequency_unit.to_hz(v));
            let opens_next_point = match (self.last_freq, leading_freq) {
                (Some(prev), Some(candidate)) if !self.accumulator.is_empty() => candidate > prev,
                _ => false,
            };

            if opens_next_point {
                let set = self.accumulator.take_all();
                let n = infer_num_ports(set.len()).ok_or_else(|| {
                    TouchstoneError::semantic(
                        "could not infer number of ports from version-1 data",
                    )
                })?;
                self.establish_num_ports(n, consumer);
                self.complete_data_set(set)?;
                return self.handle_data_or_noise(line, consumer);
            }

            if self.accumulator.is_empty() {
                self.last_freq = leading_freq;
            }
            self.accumulator.extend(&tokens);
            return Ok(());
        }

        let n = self
            .num_vals_per_set
            .expect("num_vals_per_set must be known once past inference");
        self.accumulator.extend(&tokens);
        while self.accumulator.len() >= n {
            let (set, excess) = self.accumulator.take_set(n);
            if excess {
                warn!("more tokens than expected in last data-set; excess spills into next set");
            }
            match self.state {
                State::DataLines => self.complete_data_set(set)?,
                State::NoiseData => self.complete_noise_set(set)?,
                _ => unreachable!("data/noise accumulation only runs in those two states"),
            }
        }
        Ok(())
    }

    fn begin_noise_section(&mut self, consumer: &mut impl Consumer) -> Result<()> {
        if self.state != State::DataLines {
            return Err(TouchstoneError::semantic(
                "[NOISE DATA] is only valid while reading network data",
            ));
        }
        let num_ports = self.num_ports.unwrap_or(0);
        if num_ports != 2 {
            return Err(TouchstoneError::semantic(
                "noise data is only supported for two-port networks",
            ));
        }
        self.flush_pending(consumer);
        self.store.reshape(4);
        self.num_vals_per_set = Some(5);
        self.last_freq = None;
        self.state = State::NoiseData;
        debug!("entering NOISE_DATA");
        Ok(())
    }

    fn establish_num_ports(&mut self, n: usize, consumer: &mut impl Consumer) {
        self.num_ports = Some(n);
        self.num_vals_per_set = Some(self.matrix_format.payload_len(n) + 1);
        if self.store.is_empty() {
            self.store.reshape(2 * n * n);
        }
        self.emit_current_references(consumer);
    }

    fn emit_current_references(&mut self, consumer: &mut impl Consumer) {
        let values = self.reference_vector();
        self.emitter.emit_references(consumer, &values);
    }

    fn reference_vector(&self) -> Vec<f64> {
        let n = self.num_ports.unwrap_or(0);
        if let Some(overrides) = &self.reference_resistances {
            return overrides.clone();
        }
        let normalize_to_unity = self.file_version == Some(2) && self.parameter_kind != ParameterKind::S;
        let value = if normalize_to_unity { 1.0 } else { self.reference_resistance };
        vec![value; n]
    }

    fn complete_data_set(&mut self, set: Vec<f64>) -> Result<()> {
        let freq_hz = self.frequency_unit.to_hz(set[0]);
        if freq_hz <= 0.0 {
            return Err(TouchstoneError::semantic(format!(
                "non-positive frequency {freq_hz} in data set"
            )));
        }
        let num_ports = self.num_ports.expect("num_ports known before a data set completes");
        let payload = &set[1..];

        let mut block = assemble_matrix(payload, num_ports, self.matrix_format);
        convert_block(self.number_format, &mut block);
        match self.matrix_format {
            MatrixFormat::Upper => fill_lower(&mut block, num_ports),
            MatrixFormat::Lower => fill_upper(&mut block, num_ports),
            MatrixFormat::Full => {}
        }
        if num_ports == 2 && self.two_port_order == TwoPortOrder::Order21_12 {
            swap21_12(&mut block);
        }

        self.store.push(freq_hz, &block);
        self.last_freq = Some(freq_hz);
        Ok(())
    }

    fn complete_noise_set(&mut self, set: Vec<f64>) -> Result<()> {
        let freq_hz = self.frequency_unit.to_hz(set[0]);
        if freq_hz <= 0.0 {
            return Err(TouchstoneError::semantic(format!(
                "non-positive frequency {freq_hz} in noise data set"
            )));
        }
        let nf_min_linear = noise_db_to_linear(set[1]);
        let gamma_opt_mag = set[2];
        let gamma_opt_angle_rad = set[3] * PI / 180.0;
        let rn_norm = set[4];

        self.store
            .push(freq_hz, &[nf_min_linear, gamma_opt_mag, gamma_opt_angle_rad, rn_norm]);
        Ok(())
    }

    fn flush_pending(&mut self, consumer: &mut impl Consumer) {
        if self.store.is_empty() {
            return;
        }
        let num_ports = self.num_ports.unwrap_or(0);
        match self.state {
            State::NoiseData => {
                self.emitter
                    .emit_noise(consumer, self.store.frequencies(), self.store.data(), num_ports);
            }
            _ => {
                self.emitter.emit_network(
                    consumer,
                    self.store.frequencies(),
                    self.store.data(),
                    self.parameter_kind,
                    num_ports,
                );
            }
        }
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Packet;

    fn run(input: &str) -> Vec<String> {
        let mut parser = Parser::new();
        let mut log = Vec::new();
        let mut sink = |p: Packet<'_>| log.push(format!("{p:?}"));
        parser.receive(input.as_bytes(), &mut sink).unwrap();
        parser.end(&mut sink).unwrap();
        log
    }

    #[test]
    fn scenario_1_minimal_one_port_v1_ma() {
        let log = run("# GHZ S MA R 50\n1.0 0.5 90\n");
        assert!(log.iter().any(|l| l.contains("ReferenceResistances([50.0]")));
        assert!(log.iter().any(|l| l.contains("FrequencyAxis([1000000000.0]")));
        assert!(log.iter().any(|l| l.contains("NetworkData")));
    }

    #[test]
    fn scenario_2_two_port_swap21_12() {
        let log = run("# HZ S MA R 50\n1e9 .99 0 .01 180 .5 45 .98 5\n");
        let network = log.iter().find(|l| l.contains("NetworkData")).unwrap();
        // after swap21_12 the emitted order is S11,S12,S21,S22 magnitudes .99,.5,.01,.98
        assert!(network.contains("0.99"));
        assert!(network.contains("0.98"));
    }

    #[test]
    fn scenario_4_version2_upper_matrix() {
        let input = concat!(
            "[VERSION] 2.0\n",
            "# GHZ S MA R 50\n",
            "[NUMBER OF PORTS] 3\n",
            "[MATRIX FORMAT] UPPER\n",
            "[NETWORK DATA]\n",
            "1.0 1 0 2 0 3 0 4 0 5 0 6 0\n",
            "[END]\n",
        );
        let log = run(input);
        assert!(log.iter().any(|l| l.contains("NetworkData")));
    }

    #[test]
    fn scenario_5_reference_override() {
        let input = concat!(
            "[VERSION] 2.0\n",
            "# GHZ S MA R 50\n",
            "[NUMBER OF PORTS] 4\n",
            "[REFERENCE] 50 75 50 75\n",
            "[NETWORK DATA]\n",
        );
        let log = run(input);
        assert!(log
            .iter()
            .any(|l| l.contains("ReferenceResistances([50.0, 75.0, 50.0, 75.0]")));
    }

    #[test]
    fn scenario_6_rejects_mixed_mode() {
        let mut parser = Parser::new();
        let mut sink = |_: Packet<'_>| {};
        let result = parser.receive(b"[VERSION] 2.0\n[MIXED-MODE ORDER]\n", &mut sink);
        assert!(result.is_err());
    }

    #[test]
    fn version1_infers_one_port_from_first_line() {
        let log = run("# GHZ S MA R 50\n1.0 0.5 90\n");
        assert!(log.iter().any(|l| l.contains("ReferenceResistances([50.0]")));
    }

    #[test]
    fn rejects_content_after_end() {
        let mut parser = Parser::new();
        let mut sink = |_: Packet<'_>| {};
        let result = parser.receive(
            b"[VERSION] 2.0\n# GHZ S MA\n[NUMBER OF PORTS] 1\n[NETWORK DATA]\n1.0 1 0\n[END]\nGARBAGE\n",
            &mut sink,
        );
        assert!(result.is_err());
    }

    #[test]
    fn frequency_must_be_strictly_positive() {
        let mut parser = Parser::new();
        let mut sink = |_: Packet<'_>| {};
        parser
            .receive(b"# GHZ S MA R 50\n0.0 0.5 90\n", &mut sink)
            .unwrap();
        let result = parser.end(&mut sink);
        assert!(result.is_err());
    }
}
