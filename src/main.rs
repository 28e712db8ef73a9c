use dashblast::error::AppResult;

fn main() -> AppResult<()> {
    dashblast::entry::run()
}
