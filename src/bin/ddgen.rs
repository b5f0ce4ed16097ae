fn main() {
    ddelta::cli::run_gen();
}
