// tests/greeks_test.rs
use fast_bsm::analytics::bs_analytic::{self, VEGA_SCALE};
use fast_bsm::analytics::{ContractType, MarketParameters, ThetaConvention};
use fast_bsm::BsmError;
use rstest::rstest;

fn textbook_params() -> MarketParameters {
    MarketParameters::new(100.0, 100.0, 1.0, 0.20, 0.05, 0.0).expect("Valid parameters")
}

fn dividend_params() -> MarketParameters {
    MarketParameters::new(110.0, 100.0, 0.5, 0.30, 0.03, 0.02).expect("Valid parameters")
}

fn assert_rel(actual: f64, expected: f64, tol: f64, label: &str) {
    let rel_error = (actual - expected).abs() / expected.abs();
    println!("{}: actual {} expected {} rel error {}", label, actual, expected, rel_error);
    assert!(rel_error < tol, "Relative error for {} exceeds tolerance: {}", label, rel_error);
}

#[test]
fn test_bs_call_premium_textbook_value() {
    let price = bs_analytic::premium(ContractType::Call, &textbook_params()).unwrap();
    assert!((price - 10.4506).abs() < 1e-4, "Call premium {}", price);
}

#[rstest]
#[case(ContractType::Call, 0.6057720538221991, 53.232481545376345, -0.01757267820941972)]
#[case(ContractType::Put, -0.3454573706785149, -41.89046090469506, -0.004542138147766099)]
fn test_bs_greeks_textbook(
    #[case] contract: ContractType,
    #[case] expected_delta: f64,
    #[case] expected_rho: f64,
    #[case] expected_theta: f64,
) {
    let g = bs_analytic::greeks(contract, &textbook_params()).unwrap();

    assert_rel(g.delta, expected_delta, 1e-9, "Delta");
    assert_rel(g.gamma, 0.018762017345846895, 1e-9, "Gamma");
    assert_rel(g.vega, 0.3752403469169379, 1e-9, "Vega");
    assert_rel(g.theta, expected_theta, 1e-9, "Theta");
    assert_rel(g.rho, expected_rho, 1e-9, "Rho");
}

#[rstest]
#[case(ContractType::Call, 14.914347224531653, 0.707982929207214, 31.677070350172244)]
#[case(ContractType::Put, 4.520059472429423, -0.27712901039584875, -17.578526629980885)]
fn test_bs_with_dividend_yield(
    #[case] contract: ContractType,
    #[case] expected_premium: f64,
    #[case] expected_delta: f64,
    #[case] expected_rho: f64,
) {
    let params = dividend_params();
    assert_rel(
        bs_analytic::premium(contract, &params).unwrap(),
        expected_premium,
        1e-9,
        "Premium",
    );
    assert_rel(bs_analytic::delta(contract, &params).unwrap(), expected_delta, 1e-9, "Delta");
    assert_rel(bs_analytic::rho(contract, &params).unwrap(), expected_rho, 1e-9, "Rho");
    assert_rel(bs_analytic::gamma(&params).unwrap(), 0.01431490376854848, 1e-9, "Gamma");
    assert_rel(bs_analytic::vega(&params).unwrap(), 0.2598155033991549, 1e-9, "Vega");
}

// Put theta has two conventions for the discounted-strike term. The
// textbook one (default) weights it with Φ(-d₂); the density variant
// reproduces legacy figures that weight it with φ(-d₂).
#[test]
fn test_put_theta_conventions_differ() {
    let params = textbook_params();

    let textbook = bs_analytic::theta(ContractType::Put, &params).unwrap();
    let density =
        bs_analytic::theta_with_convention(ContractType::Put, &params, ThetaConvention::DensityDiscount)
            .unwrap();

    assert_rel(textbook, -0.004542138147766099, 1e-9, "Theta (textbook)");
    assert_rel(density, -0.0051402787248895606, 1e-9, "Theta (density)");

    // r*K*e^(-rT)*(Φ(-d₂) - φ(-d₂)) / 365
    let gap = textbook - density;
    assert!((gap - 0.0005981405771234615).abs() < 1e-12, "Theta gap {}", gap);
}

#[test]
fn test_put_theta_matches_time_derivative() {
    // Theta per day ≈ -(V(T) - V(T - dT)) / dT / 365 with calendar-time decay
    let params = dividend_params();
    let h = 1e-5;
    let longer = MarketParameters {
        time_to_expiry: params.time_to_expiry + h,
        ..params
    };
    let shorter = MarketParameters {
        time_to_expiry: params.time_to_expiry - h,
        ..params
    };
    let dv_dt = (bs_analytic::premium(ContractType::Put, &longer).unwrap()
        - bs_analytic::premium(ContractType::Put, &shorter).unwrap())
        / (2.0 * h);
    let theta = bs_analytic::theta(ContractType::Put, &params).unwrap();

    assert_rel(theta, -dv_dt / 365.0, 1e-5, "Theta vs finite difference");
}

#[test]
fn test_vega_scaling_matches_finite_difference() {
    let params = dividend_params();
    let h = 1e-6;
    let up = params.with_volatility(params.volatility + h);
    let down = params.with_volatility(params.volatility - h);
    let dv_dsigma = (bs_analytic::premium(ContractType::Call, &up).unwrap()
        - bs_analytic::premium(ContractType::Call, &down).unwrap())
        / (2.0 * h);

    let vega = bs_analytic::vega(&params).unwrap();
    assert_rel(vega * VEGA_SCALE, dv_dsigma, 1e-6, "Vega x 100 vs dV/dσ");
}

#[test]
fn test_gamma_matches_finite_difference() {
    let params = textbook_params();
    let h = 1e-3;
    let bump = |ds: f64| MarketParameters {
        underlying_price: params.underlying_price + ds,
        ..params
    };
    let up = bs_analytic::premium(ContractType::Call, &bump(h)).unwrap();
    let mid = bs_analytic::premium(ContractType::Call, &params).unwrap();
    let down = bs_analytic::premium(ContractType::Call, &bump(-h)).unwrap();

    let fd_gamma = (up - 2.0 * mid + down) / (h * h);
    assert_rel(bs_analytic::gamma(&params).unwrap(), fd_gamma, 1e-4, "Gamma vs finite difference");
}

#[rstest]
#[case(0.0, 100.0, 1.0, 0.2)]
#[case(100.0, 0.0, 1.0, 0.2)]
#[case(100.0, 100.0, 0.0, 0.2)]
#[case(100.0, 100.0, -1.0, 0.2)]
#[case(100.0, 100.0, 1.0, 0.0)]
#[case(100.0, 100.0, f64::NAN, 0.2)]
fn test_every_formula_rejects_invalid_inputs(
    #[case] s: f64,
    #[case] k: f64,
    #[case] t: f64,
    #[case] sigma: f64,
) {
    let params = MarketParameters {
        underlying_price: s,
        strike_price: k,
        time_to_expiry: t,
        volatility: sigma,
        risk_free_rate: 0.05,
        dividend_yield: 0.0,
    };
    let is_invalid = |r: Result<f64, BsmError>| matches!(r, Err(BsmError::InvalidParameters { .. }));

    assert!(is_invalid(bs_analytic::premium(ContractType::Call, &params)));
    assert!(is_invalid(bs_analytic::delta(ContractType::Put, &params)));
    assert!(is_invalid(bs_analytic::gamma(&params)));
    assert!(is_invalid(bs_analytic::vega(&params)));
    assert!(is_invalid(bs_analytic::theta(ContractType::Call, &params)));
    assert!(is_invalid(bs_analytic::rho(ContractType::Put, &params)));
    assert!(bs_analytic::greeks(ContractType::Call, &params).is_err());
}
