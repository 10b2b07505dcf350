/// Rothfusz regression coefficients for temperature and humidity in °C and %.
const COEFS: [f64; 9] = [
    -8.784695,
    1.61139411,
    2.338549,
    -0.14611605,
    -1.2308094e-2,
    -1.6424828e-2,
    2.211732e-3,
    7.2546e-4,
    -3.582e-6,
];

/// Apparent temperature in °C from temperature (°C) and relative humidity (%).
pub fn heat_index(temperature: f64, humidity: f64) -> f64 {
    let t = temperature;
    let h = humidity;
    let terms = [
        1.0,
        t,
        h,
        t * h,
        t * t,
        h * h,
        t * t * h,
        t * h * h,
        t * t * h * h,
    ];
    COEFS.iter().zip(terms).map(|(coef, term)| coef * term).sum()
}
