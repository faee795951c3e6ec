use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the `UNIQUE_ID` the counterparty accepts for collections
pub const UNIQUE_ID_LEN: usize = 50;

/// Random `[0-9a-zA-Z]` string, e.g. for a collection's `UNIQUE_ID`
///
/// The counterparty treats this as the idempotency key of a collection and
/// expects the same value back in a later status inquiry.
pub fn unique_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
