// Prompt templates for every generative-text call the screener makes.
// Placeholders are substituted with `str::replace`.

/// System prompt for plain-text replies.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a concise technical recruiting assistant. \
    Answer with the requested content only. \
    Do NOT include greetings, explanations or apologies.";

/// Asks for a comma-separated skill list. `{resume_text}` is replaced with the resume.
pub const SKILL_EXTRACTION_PROMPT: &str = "\
Extract technical skills from the following resume text.
Focus on programming languages, frameworks, databases, tools, and methodologies.
Reply with a single line of skills separated by a comma and a space.
Resume Text:
{resume_text}
";

/// `{skills}` is replaced with the comma-joined skill gaps.
pub const COURSE_PROMPT: &str = "Suggest 3 high-quality online courses for learning: {skills}. \
    Provide platform name (Coursera, Udemy, edX) and course title, one course per line.";

/// `{skills}` is replaced with the comma-joined skill gaps.
pub const QUIZ_PROMPT: &str = r#"
Create 3 multiple-choice quiz questions to test knowledge in: {skills}.
Format as a JSON array where each object has the following fields:
- 'question': The multiple-choice question text.
- 'options': An array of strings, representing the answer options labeled A, B, C, and D.
- 'answer': A string indicating the correct answer option (e.g., 'A', 'B', 'C', or 'D').

Example:
[
  {
    "question": "What is the capital of France?",
    "options": ["A. Berlin", "B. Paris", "C. Madrid", "D. Rome"],
    "answer": "B"
  }
]
"#;
