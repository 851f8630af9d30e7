use rand::Rng;

/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a short numeric proof-of-delivery code.
///
/// Four digits, zero-padded. The code is stored on the order at creation
/// and printed on the customer stub; it is never sent to the courier.
pub fn delivery_code() -> String {
    let n: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{:04}", n)
}
