use rand::Rng;

pub const ORDER_PREFIX: &str = "ORD";
pub const PAYMENT_PREFIX: &str = "PMT";

/// Random suffix in `100000..=999999`.
pub fn six_digit_suffix<R: Rng>(rng: &mut R) -> u32 {
    rng.gen_range(100_000..1_000_000)
}

pub fn format_reference(prefix: &str, namespace: &str, suffix: u32) -> String {
    format!("{prefix}-{namespace}-{suffix:06}")
}

/// Draw an order reference and a payment reference that differ from each
/// other. Uniqueness across orders is left to the database index.
pub fn draw_reference_pair<R: Rng>(rng: &mut R, namespace: &str) -> (String, String) {
    let order_suffix = six_digit_suffix(rng);
    let mut payment_suffix = six_digit_suffix(rng);
    while payment_suffix == order_suffix {
        payment_suffix = six_digit_suffix(rng);
    }
    (
        format_reference(ORDER_PREFIX, namespace, order_suffix),
        format_reference(PAYMENT_PREFIX, namespace, payment_suffix),
    )
}

/// `true` when `reference` looks like `<prefix>-<namespace>-<6 digits>`.
#[cfg(test)]
pub fn matches_format(reference: &str, prefix: &str, namespace: &str) -> bool {
    let Some(rest) = reference
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
        .and_then(|r| r.strip_prefix(namespace))
        .and_then(|r| r.strip_prefix('-'))
    else {
        return false;
    };
    rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_digit())
}
