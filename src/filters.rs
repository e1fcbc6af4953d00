//! Digital linear filter for Hankel transforms of order 0 and 1.
//!
//! A Hankel transform `F(r) = ∫₀^∞ K(λ) J_ν(λr) dλ` is approximated by
//!
//! ```text
//! F(r) ≈ (1/r) Σᵢ K(bᵢ / r) wᵢ
//! ```
//!
//! where `bᵢ` are log-spaced abscissas shared by both orders and `wᵢ` are
//! order-specific weights. The table below has 101 points with
//! `ln bᵢ = 0.25 + 0.15 (i − 50)`, so it spans `7.1e-4 ≤ b ≤ 2.3e3`.
//!
//! The weights were obtained by least squares against closed-form transform
//! pairs (`λe^{-λ²}`, `λ^q e^{-aλ}` for J0; `λ²e^{-λ²}`, `λ^q e^{-aλ}` for J1)
//! sampled over `1e-3 ≤ r ≤ 1e3`, with the Mellin moments
//! `∫ t^q J_ν(t) dt` (q = 0, 1, 2) imposed as heavily weighted rows. The
//! moment rows make the filter integrate kernels that tend to a constant at
//! large λ, which is what a magnetic dipole on the ground surface produces.
//!
//! Accuracy against closed-form half-space responses is better than 1e-6
//! (relative L2) for offsets up to ~30 skin depths.
//!
//! Published filters, such as the 101-point J0/J1 filter of Key (2009)
//! distributed as `key_101_2009` in libdlf, are plain three-column text
//! (`base j0 j1`). [`FilterTable::parse`] reads that format without
//! rounding, so a simulation can run on a published table bit-for-bit via
//! `Simulation1DLayered::with_filter`.

use std::borrow::Cow;

use crate::errors::ConfigurationError;
use crate::math::Scalar;

/// Number of abscissas in the bundled filter.
pub const FILTER_LENGTH: usize = 101;

/// Bessel order of a Hankel transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HankelOrder {
    /// J0 kernel.
    Zero,
    /// J1 kernel.
    One,
}

/// Immutable abscissa/weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTable {
    name: Cow<'static, str>,
    base: Cow<'static, [Scalar]>,
    j0: Cow<'static, [Scalar]>,
    j1: Cow<'static, [Scalar]>,
}

static STANDARD: FilterTable = FilterTable {
    name: Cow::Borrowed("layered_em_101"),
    base: Cow::Borrowed(&BASE),
    j0: Cow::Borrowed(&J0_WEIGHTS),
    j1: Cow::Borrowed(&J1_WEIGHTS),
};

impl FilterTable {
    /// The bundled process-wide 101-point table.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Builds a table from its columns.
    ///
    /// The abscissas must be positive, finite and strictly increasing, and
    /// all three columns must have the same length.
    pub fn new(
        name: impl Into<String>,
        base: Vec<Scalar>,
        j0: Vec<Scalar>,
        j1: Vec<Scalar>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let invalid = |reason: String| ConfigurationError::InvalidFilter { name: name.clone(), reason };
        if base.len() < 2 {
            return Err(invalid(format!("needs at least 2 abscissas, found {}", base.len())));
        }
        if j0.len() != base.len() || j1.len() != base.len() {
            return Err(invalid(format!(
                "column lengths differ: base {}, j0 {}, j1 {}",
                base.len(),
                j0.len(),
                j1.len()
            )));
        }
        if !base.iter().all(|b| *b > 0.0 && b.is_finite()) {
            return Err(invalid("abscissas must be positive and finite".into()));
        }
        if let Some(i) = base.windows(2).position(|w| w[1] <= w[0]) {
            return Err(invalid(format!("abscissas not increasing at row {}", i + 1)));
        }
        if !j0.iter().chain(&j1).all(|w| w.is_finite()) {
            return Err(invalid("weights must be finite".into()));
        }
        Ok(Self {
            name: Cow::Owned(name),
            base: Cow::Owned(base),
            j0: Cow::Owned(j0),
            j1: Cow::Owned(j1),
        })
    }

    /// Reads a three-column `base j0 j1` table; blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let (mut base, mut j0, mut j1) = (Vec::new(), Vec::new(), Vec::new());
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row: Vec<Scalar> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|e| ConfigurationError::InvalidFilter {
                    name: name.clone(),
                    reason: format!("line {}: {e}", line_no + 1),
                })?;
            let [b, w0, w1] = row[..] else {
                return Err(ConfigurationError::InvalidFilter {
                    name,
                    reason: format!("line {}: expected 3 columns, found {}", line_no + 1, row.len()),
                });
            };
            base.push(b);
            j0.push(w0);
            j1.push(w1);
        }
        Self::new(name, base, j0, j1)
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of abscissas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Always false; tables hold at least two abscissas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Filter abscissas `bᵢ` (dimensionless).
    #[must_use]
    pub fn base(&self) -> &[Scalar] {
        &self.base
    }

    /// Weights for the requested Bessel order.
    #[must_use]
    pub fn weights(&self, order: HankelOrder) -> &[Scalar] {
        match order {
            HankelOrder::Zero => &self.j0,
            HankelOrder::One => &self.j1,
        }
    }

    /// Smallest abscissa.
    #[must_use]
    pub fn min_base(&self) -> Scalar {
        self.base[0]
    }

    /// Largest abscissa.
    #[must_use]
    pub fn max_base(&self) -> Scalar {
        self.base[self.base.len() - 1]
    }

    /// Radial wavenumbers `λᵢ = bᵢ / r` sampled for offset `r`.
    pub fn wavenumbers(&self, offset: Scalar) -> impl Iterator<Item = Scalar> + '_ {
        self.base.iter().map(move |b| b / offset)
    }

    /// Applies the filter to kernel samples already taken at [`Self::wavenumbers`].
    #[must_use]
    pub fn apply<T>(&self, order: HankelOrder, offset: Scalar, samples: &[T]) -> T
    where
        T: Copy + std::ops::Mul<Scalar, Output = T> + std::ops::Add<Output = T> + std::ops::Div<Scalar, Output = T>,
    {
        let weights = self.weights(order);
        let mut acc = samples[0] * weights[0];
        for (s, w) in samples.iter().zip(weights.iter()).skip(1) {
            acc = acc + *s * *w;
        }
        acc / offset
    }
}

#[rustfmt::skip]
const BASE: [Scalar; FILTER_LENGTH] = [
    0.000710174388842549, 0.0008251049232659046, 0.0009586351536940207,
    0.0011137751478448032, 0.001294022105465849, 0.0015034391929775724,
    0.0017467471362611197, 0.002029430636295734, 0.002357862006490233,
    0.0027394448187683705, 0.003182780796509667, 0.003697863716482932,
    0.00429630469075234, 0.004991593906910217, 0.0057994047268421466,
    0.006737946999085467, 0.007828377549225773, 0.009095277101695816,
    0.010567204383852655, 0.012277339903068448, 0.014264233908999256,
    0.016572675401761255, 0.01925470177538692, 0.0223707718561656,
    0.025991128778755347, 0.0301973834223185, 0.03508435410084504,
    0.040762203978366225, 0.04735892439114093, 0.05502322005640723,
    0.06392786120670757, 0.07427357821433388, 0.08629358649937054,
    0.10025884372280375, 0.11648415777349697, 0.1353352832366127,
    0.1572371663136276, 0.18268352405273466, 0.2122479738267431,
    0.2465969639416065, 0.2865047968601901, 0.3328710836980796,
    0.38674102345450123, 0.44932896411722156, 0.522045776761016,
    0.6065306597126334, 0.7046880897187134, 0.8187307530779819,
    0.951229424500714, 1.1051709180756477, 1.2840254166877414,
    1.4918246976412703, 1.7332530178673953, 2.0137527074704766,
    2.3396468519259908, 2.718281828459045, 3.158192909689767,
    3.6692966676192444, 4.263114515168817, 4.953032424395114,
    5.754602676005731, 6.6858944422792685, 7.767901106306771,
    9.025013499434122, 10.485569724727576, 12.182493960703473,
    14.1540386453758, 16.444646771097048, 19.105953728231643,
    22.197951281441636, 25.790339917193062, 29.96410004739701,
    34.81331748760201, 40.44730436006738, 46.993063231579264,
    54.598150033144236, 63.434000298123344, 73.69979369959579,
    85.62694400220059, 99.48431564193378, 115.58428452718766,
    134.2897796849354, 156.02246448639497, 181.27224187515122,
    210.60829786667438, 244.69193226422038, 284.2914658239207,
    330.2995599096486, 383.7533390611119, 445.85777008251677,
    518.012824668342, 601.8450378720818, 699.2441738158852,
    812.4058251675433, 943.8809066715781, 1096.6331584284585,
    1274.105955173453, 1480.299927584545, 1719.8631453759212,
    1998.1958951041172, 2321.572414611057,
];

#[rustfmt::skip]
const J0_WEIGHTS: [Scalar; FILTER_LENGTH] = [
    0.36984217374911155, -1.9045289844185505, 4.527264844972672,
    -6.6184039037801625, 6.723426426073265, -5.105847766907353,
    3.0638923781991085, -1.5248948523520027, 0.6618208978048518,
    -0.2625413891282726, 0.10150964101043443, -0.03898812671012782,
    0.017167189619596693, -0.006885816623482885, 0.004845531228789229,
    -0.0013283529052501818, 0.0027136504690961727, 0.00024954007246718056,
    0.0024571591012511615, 0.0011167017502372028, 0.002770429424173207,
    0.0019170458706990925, 0.0034141399912544818, 0.0028587177690066294,
    0.0043732908026212, 0.004068623772745731, 0.005709816356069087,
    0.005671133374498264, 0.007534710928996545, 0.00781630749741894,
    0.01000803137445931, 0.010697733521714417, 0.013348866392028223,
    0.01456923988720984, 0.017850500618272126, 0.019762034675842227,
    0.023897729666047765, 0.02669907206419185, 0.03197963787346014,
    0.03589513976285007, 0.0426795192524468, 0.04791175031090959,
    0.05659460629589848, 0.06319002479439753, 0.07407010592420324,
    0.08158261561576383, 0.09448380027172258, 0.10120244795792796,
    0.11454667353886003, 0.11590552111303679, 0.12481503724511127,
    0.110776796531078, 0.10444816914414567, 0.05785067382057033,
    0.020973623581644518, -0.07190269203233955, -0.13431816285328071,
    -0.2318247609556647, -0.22126687776252846, -0.1561930992847277,
    0.07798760179060159, 0.2763443311618706, 0.26247902903621223,
    -0.12948906402984678, -0.3814971298723927, 0.17596650728347593,
    0.2833042296748144, -0.4200164123699915, 0.3136275088965954,
    -0.18200948768546313, 0.10197231875012046, -0.06683472543968708,
    0.06048330369839998, -0.07989799213294893, 0.13708101548148596,
    -0.25503987703479114, 0.4568273357241356, -0.7488329576716605,
    1.107266575321793, -1.4780326680620752, 1.7922545421351284,
    -1.9895700135876595, 2.037274831598055, -1.93730102190666,
    1.7205016338443566, -1.433382652835422, 1.1238896058971992,
    -0.83098758176658, 0.5797621557779126, -0.38135798272845733,
    0.23592195040629235, -0.1366553463545248, 0.07360624852347536,
    -0.03649733591879125, 0.016422434514901704, -0.00657065660500017,
    0.0022703182629906287, -0.000648694368610321, 0.00014309638889114693,
    -2.1534682951798102e-05, 1.6455254618824138e-06,
];

#[rustfmt::skip]
const J1_WEIGHTS: [Scalar; FILTER_LENGTH] = [
    2.3709273016133653e-05, -0.0001204854960533579, 0.000287026214060073,
    -0.0004234132576244474, 0.00043653880585645057, -0.0003368531446808441,
    0.00020582580836693725, -0.00010350986517914083, 4.590177950126636e-05,
    -1.7622898469817437e-05, 7.768198865365211e-06, -1.7296117693220618e-06,
    2.549757785881172e-06, 1.315259457668807e-06, 2.8250812324018383e-06,
    3.213333426918027e-06, 4.735449502027347e-06, 6.090309957486085e-06,
    8.477733588801896e-06, 1.1204004142298038e-05, 1.5365146081970298e-05,
    2.048172571071084e-05, 2.7939860779475104e-05, 3.7367210266656825e-05,
    5.086882975202605e-05, 6.811062071934959e-05, 9.267502910281166e-05,
    0.00012407067857967837, 0.00016891775703288759, 0.0002258751570801745,
    0.00030801149138016016, 0.0004109275303698186, 0.0005618716492066219,
    0.0007468841020774837, 0.0010253884380315799, 0.0013556502366957174,
    0.0018719946648503322, 0.002455511612343487, 0.0034183372360806867,
    0.004433300201263187, 0.006240592745844423, 0.007962452870817517,
    0.011378645147696074, 0.014178584463658548, 0.020675715846379467,
    0.024883081008957978, 0.037274853826641086, 0.04257664795865123,
    0.06609524216047943, 0.06957972711766156, 0.1133235123171975,
    0.10404221002843839, 0.18164252400037817, 0.12793313060245007,
    0.2537966494508681, 0.08279610319337198, 0.26234656026503456,
    -0.13634584611817413, 0.11660320581831594, -0.5016719589524719,
    0.0225242752515793, -0.41377677963281956, 0.5391697186781749,
    0.03547525661496298, 0.14500186162823892, -0.6149764992466642,
    0.5473389997469398, -0.1958728149319363, -0.046600477243459976,
    0.13521097114925099, -0.16276555080159322, 0.20756124547686,
    -0.3583327083381083, 0.8206514450437133, -2.017078768276764,
    4.537288527313496, -8.840862846356881, 14.847923222576927,
    -21.735193843631592, 28.145708880166175, -32.70886298350985,
    34.55494155842034, -33.55616269103793, 30.23736654870928,
    -25.482160359518097, 20.212684358179303, -15.165957496065491,
    10.802398576282938, -7.31926464610008, 4.719233713030978,
    -2.890902766987881, 1.6757679432436698, -0.9128175852249059,
    0.46226588863395357, -0.21428792841379193, 0.08895647775858484,
    -0.03205978630971978, 0.009588188777023356, -0.00221808998098946,
    0.0003503022310457818, -2.8086892716232356e-05,
];
