use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            na_world_fuzz::test(data);
        });
    }
}
