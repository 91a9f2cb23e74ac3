//! A convenience [`Consumer`] that assembles the parser's packet
//! stream into owned, complex-valued matrices. The core only emits flat `&[f64]` views
//! tagged by [`Packet`], so a downstream analysis tool that wants
//! actual complex numbers would otherwise have to redo the
//! (magnitude, phase) -> complex conversion itself).

use ndarray::{Array1, Array3};
use num::Complex;

use crate::emitter::{Consumer, Packet};
use crate::params::ParameterKind;

/// One flushed sweep: the frequency axis and per-frequency N×N
/// complex parameter matrices, alongside the per-port reference
/// impedance in effect when they were emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub kind: ParameterKind,
    pub num_ports: usize,
    pub frequencies_hz: Array1<f64>,
    pub reference_ohms: Array1<f64>,
    /// Shape `(frequencies_hz.len(), num_ports, num_ports)`, row-major
    /// per point, matching on-wire `(row, column)` order after the
    /// parser's triangle-fill and 21/12 swap have already run.
    pub parameters: Array3<Complex<f64>>,
}

/// One flushed two-port noise sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSweep {
    pub frequencies_hz: Array1<f64>,
    pub nf_min: Array1<f64>,
    pub gamma_opt: Array1<Complex<f64>>,
    pub rn_norm: Array1<f64>,
}

/// Collects an entire parse session's packets into [`Network`] and
/// [`NoiseSweep`] values. Pass `&mut self` wherever a [`Consumer`] is
/// expected, then read [`TouchstoneDocument::networks`] /
/// [`TouchstoneDocument::noise`] once the session's `end()` returns.
#[derive(Debug)]
pub struct TouchstoneDocument {
    reference_ohms: Array1<f64>,
    pending_freq: Vec<f64>,
    networks: Vec<Network>,
    noise: Vec<NoiseSweep>,
}

impl TouchstoneDocument {
    pub fn new() -> Self {
        TouchstoneDocument {
            reference_ohms: Array1::from_vec(Vec::new()),
            pending_freq: Vec::new(),
            networks: Vec::new(),
            noise: Vec::new(),
        }
    }

    /// Every network-parameter sweep flushed so far, in emission order.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Every noise sweep flushed so far, in emission order.
    pub fn noise(&self) -> &[NoiseSweep] {
        &self.noise
    }
}

impl Default for TouchstoneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Consumer for TouchstoneDocument {
    fn accept(&mut self, packet: Packet<'_>) {
        match packet {
            Packet::FrameBegin | Packet::FrameEnd => {}
            Packet::ReferenceResistances(values) => {
                self.reference_ohms = Array1::from_vec(values.to_vec());
            }
            Packet::FrequencyAxis(values) => {
                self.pending_freq = values.to_vec();
            }
            Packet::NetworkData { kind, num_ports, values } => {
                self.networks.push(build_network(
                    kind,
                    num_ports,
                    std::mem::take(&mut self.pending_freq),
                    self.reference_ohms.clone(),
                    values,
                ));
            }
            Packet::NoiseData { num_ports: _, values } => {
                self.noise
                    .push(build_noise(std::mem::take(&mut self.pending_freq), values));
            }
        }
    }
}

fn build_network(
    kind: ParameterKind,
    num_ports: usize,
    freq: Vec<f64>,
    reference_ohms: Array1<f64>,
    values: &[f64],
) -> Network {
    let count = freq.len();
    let element = 2 * num_ports * num_ports;
    let mut parameters = Array3::from_elem((count, num_ports, num_ports), Complex::new(0.0, 0.0));
    for point in 0..count {
        let base = point * element;
        for row in 0..num_ports {
            for col in 0..num_ports {
                let idx = base + 2 * (row * num_ports + col);
                parameters[[point, row, col]] = Complex::from_polar(values[idx], values[idx + 1]);
            }
        }
    }
    Network {
        kind,
        num_ports,
        frequencies_hz: Array1::from_vec(freq),
        reference_ohms,
        parameters,
    }
}

fn build_noise(freq: Vec<f64>, values: &[f64]) -> NoiseSweep {
    let count = freq.len();
    let mut nf_min = Array1::<f64>::zeros(count);
    let mut gamma_opt = Array1::from_elem(count, Complex::new(0.0, 0.0));
    let mut rn_norm = Array1::<f64>::zeros(count);
    for point in 0..count {
        let base = point * 4;
        nf_min[point] = values[base];
        gamma_opt[point] = Complex::from_polar(values[base + 1], values[base + 2]);
        rn_norm[point] = values[base + 3];
    }
    NoiseSweep {
        frequencies_hz: Array1::from_vec(freq),
        nf_min,
        gamma_opt,
        rn_norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn assembles_one_port_network_into_complex_matrix() {
        let mut parser = Parser::new();
        let mut doc = TouchstoneDocument::new();
        parser
            .receive(b"# GHZ S MA R 50\n1.0 0.5 90\n", &mut doc)
            .unwrap();
        parser.end(&mut doc).unwrap();

        assert_eq!(doc.networks().len(), 1);
        let net = &doc.networks()[0];
        assert_eq!(net.num_ports, 1);
        assert_eq!(net.frequencies_hz.as_slice().unwrap(), &[1e9]);
        let s11 = net.parameters[[0, 0, 0]];
        assert!((s11.re - 0.0).abs() < 1e-9);
        assert!((s11.im - 0.5).abs() < 1e-9);
        assert_eq!(net.reference_ohms.as_slice().unwrap(), &[50.0]);
    }

    #[test]
    fn assembles_noise_sweep() {
        let input = concat!(
            "# HZ S MA R 50\n",
            "1e9 .99 0 .01 180 .5 45 .98 5\n",
            "[NOISE DATA]\n",
            "5e8 0.5 0.3 90 0.7\n",
        );
        let mut parser = Parser::new();
        let mut doc = TouchstoneDocument::new();
        parser.receive(input.as_bytes(), &mut doc).unwrap();
        parser.end(&mut doc).unwrap();

        assert_eq!(doc.noise().len(), 1);
        let noise = &doc.noise()[0];
        assert!((noise.nf_min[0] - 10f64.powf(0.05)).abs() < 1e-9);
        assert!((noise.rn_norm[0] - 0.7).abs() < 1e-12);
    }
}
