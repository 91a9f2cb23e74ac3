//! Typed packets published to the consumer callback, in the order
//! fixed by the protocol: reference resistances, frequency axis, parameter
//! (or noise) data.

use crate::params::ParameterKind;
use tracing::debug;

/// One semantically-tagged record handed to the consumer. Every
/// variant borrows from the parser's own buffers — the consumer must
/// copy anything it needs past the callback's return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Packet<'a> {
    /// Emitted once when a parse session's first packet is about to be
    /// produced.
    FrameBegin,
    /// N doubles, one per port, in ohms. Re-emitted whenever
    /// `[REFERENCE]` or the option-line `R` token changes the value.
    ReferenceResistances(&'a [f64]),
    /// `sweep_count` doubles: the frequency, in Hz, of each sweep
    /// point in the block that follows.
    FrequencyAxis(&'a [f64]),
    /// `sweep_count * 2 * num_ports^2` doubles: the row-major
    /// (magnitude, phase-radians) pairs of each sweep point's N×N
    /// matrix.
    NetworkData {
        kind: ParameterKind,
        num_ports: usize,
        values: &'a [f64],
    },
    /// `sweep_count * 5` doubles: `(freq already emitted via
    /// FrequencyAxis, NFmin_linear, |Gamma_opt|, angle_Gamma_opt_rad,
    /// Rn_norm)` per noise point, two-port only.
    NoiseData { num_ports: usize, values: &'a [f64] },
    /// Emitted once at `end()`, after any final flush.
    FrameEnd,
}

/// Anything that can receive packets. Implemented for any
/// `FnMut(Packet<'_>)` so plain closures work as consumers.
pub trait Consumer {
    fn accept(&mut self, packet: Packet<'_>);
}

impl<F: FnMut(Packet<'_>)> Consumer for F {
    fn accept(&mut self, packet: Packet<'_>) {
        self(packet)
    }
}

/// Tracks whether the "frame begin" event has fired yet and drives
/// the fixed emission order.
#[derive(Default)]
pub struct Emitter {
    started: bool,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter { started: false }
    }

    fn ensure_started<C: Consumer + ?Sized>(&mut self, consumer: &mut C) {
        if !self.started {
            consumer.accept(Packet::FrameBegin);
            self.started = true;
        }
    }

    pub fn emit_references<C: Consumer + ?Sized>(&mut self, consumer: &mut C, values: &[f64]) {
        self.ensure_started(consumer);
        debug!(num_ports = values.len(), "emitting reference resistances");
        consumer.accept(Packet::ReferenceResistances(values));
    }

    pub fn emit_network(
        &mut self,
        consumer: &mut (impl Consumer + ?Sized),
        freq: &[f64],
        data: &[f64],
        kind: ParameterKind,
        num_ports: usize,
    ) {
        self.ensure_started(consumer);
        debug!(points = freq.len(), ?kind, num_ports, "flushing network data sweep");
        consumer.accept(Packet::FrequencyAxis(freq));
        consumer.accept(Packet::NetworkData {
            kind,
            num_ports,
            values: data,
        });
    }

    pub fn emit_noise(
        &mut self,
        consumer: &mut (impl Consumer + ?Sized),
        freq: &[f64],
        data: &[f64],
        num_ports: usize,
    ) {
        self.ensure_started(consumer);
        debug!(points = freq.len(), num_ports, "flushing noise data sweep");
        consumer.accept(Packet::FrequencyAxis(freq));
        consumer.accept(Packet::NoiseData { num_ports, values: data });
    }

    pub fn end(&mut self, consumer: &mut (impl Consumer + ?Sized)) {
        if self.started {
            consumer.accept(Packet::FrameEnd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_begin_fires_once_before_first_packet() {
        let mut emitter = Emitter::new();
        let mut seen = Vec::new();
        let mut sink = |p: Packet<'_>| seen.push(format!("{p:?}"));
        emitter.emit_references(&mut sink, &[50.0]);
        emitter.emit_references(&mut sink, &[50.0]);
        assert_eq!(seen.iter().filter(|s| s.contains("FrameBegin")).count(), 1);
    }

    #[test]
    fn frame_end_only_fires_if_session_started() {
        let mut emitter = Emitter::new();
        let mut seen = Vec::new();
        let mut sink = |p: Packet<'_>| seen.push(format!("{p:?}"));
        emitter.end(&mut sink);
        assert!(seen.is_empty());
    }

    #[test]
    fn network_flush_emits_frequency_then_data() {
        let mut emitter = Emitter::new();
        let mut seen = Vec::new();
        let mut sink = |p: Packet<'_>| seen.push(format!("{p:?}"));
        emitter.emit_network(&mut sink, &[1e9], &[1.0, 0.0], ParameterKind::S, 1);
        assert!(seen[1].contains("FrequencyAxis"));
        assert!(seen[2].contains("NetworkData"));
    }
}
