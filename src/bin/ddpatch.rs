fn main() {
    ddelta::cli::run_patch();
}
