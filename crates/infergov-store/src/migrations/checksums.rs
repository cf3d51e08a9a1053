use infergov_core::codec::hash_hex;

pub fn compute_checksum(sql: &str) -> String {
    hash_hex(sql.as_bytes())
}
