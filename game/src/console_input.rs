use std::io::{stdout, Write};

use vowel_race::LineReader;

pub async fn ask_line(reader: &LineReader, prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    stdout().flush()?;
    let line = reader.request_line()?.wait().await?;
    Ok(line.trim().to_string())
}

pub async fn ask_yes_no(reader: &LineReader, prompt: &str) -> anyhow::Result<bool> {
    let answer = ask_line(reader, prompt).await?;
    Ok(answer.eq_ignore_ascii_case("y"))
}
