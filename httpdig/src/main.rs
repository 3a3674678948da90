use std::cmp::max;

use anyhow::{Context, Result};
use httpdig::{Reply, Resolver};
use httpdig_proto::RCode;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod args;

use args::Args;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let resolver = Resolver::from_config(args.clone().into());

    let reply = resolver
        .send(&args.name, &args.qtype)
        .with_context(|| format!("Could not query {} for {}.", resolver.endpoint(), args.name))?;

    display_result(&reply, &args, resolver.endpoint())
}

fn display_result(reply: &Reply, args: &Args, endpoint: &str) -> Result<()> {
    let output = owo_colors::Stream::Stdout;
    let res = &reply.response;

    if args.verbose {
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(res).context("Could not encode the response.")?
            );
            return Ok(());
        }

        println!("{}", res.as_string(Some(output)));

        if args.print_meta {
            println!();
            println!(
                "{}",
                "Query metadata:".if_supports_color(output, |s| s.yellow())
            );
            println!("\tTime:        {} ms", reply.elapsed.as_millis());
            println!("\tReply size:  {} bytes", reply.bytes_recvd);
            println!("\tServer:      {}", endpoint);
        }
        return Ok(());
    }

    let all_answers: Vec<_> = res.answers.iter().chain(res.authority.iter()).collect();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&all_answers)
                .context("Could not encode the answers.")?
        );
        return Ok(());
    }

    if all_answers.is_empty() {
        println!("<empty response>");
    } else if !args.pad_answers {
        for answer in &all_answers {
            println!("{}", answer.as_string(true, None, None, Some(output)));
        }
    } else {
        let (mut max_name_len, mut max_type_len) = (0, 0);
        for answer in &all_answers {
            max_name_len = max(max_name_len, answer.name.len());
            max_type_len = max(max_type_len, answer.rtype.to_string().len());
        }
        for answer in &all_answers {
            println!(
                "{}",
                answer.as_string(false, Some(max_name_len), Some(max_type_len), Some(output))
            );
        }
    }

    if args.print_meta {
        let rcode = res.rcode();
        let style = if rcode == RCode::NOERROR {
            Style::new().green()
        } else {
            Style::new().red()
        };

        println!();
        println!(
            "{} from {} in {} ms",
            rcode
                .to_string()
                .if_supports_color(output, |s| s.style(style)),
            endpoint,
            reply.elapsed.as_millis()
        );
        if !res.comment.is_empty() {
            println!("{}", res.comment.if_supports_color(output, |s| s.dimmed()));
        }
    }

    Ok(())
}
